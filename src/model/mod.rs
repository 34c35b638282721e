pub mod house;
pub mod intent;
pub mod persona;
pub mod outcome;
pub mod chat_event;
