use std::collections::BTreeMap;

use crate::engine::ledger::MAX_POINTS;
use crate::model::house::House;

const BAR_WIDTH: usize = 20;
const BASE_RATIO: f64 = 0.6;

/// Fill ratio per house in `[0, 1]`.
///
/// Part of every bar reflects progress towards `MAX_POINTS`; the rest
/// stretches the gap between leader and trailer so close races stay visible.
/// A house with zero points always gets an empty bar.
pub fn calculate_scales(scores: &BTreeMap<House, i64>, base_ratio: f64) -> BTreeMap<House, f64> {
    let max_points = scores.values().copied().max().unwrap_or(0) as f64;
    // the floor only counts once every house is on the board
    let min_points = if scores.len() == House::ALL.len() {
        scores.values().copied().min().unwrap_or(0) as f64
    } else {
        0.0
    };
    let range = max_points - min_points;
    let max = MAX_POINTS as f64;

    let base = (min_points / max) * base_ratio;
    let interpolation = ((max_points / max) * (1.0 - base)).max(1.0 - base_ratio);

    House::ALL
        .into_iter()
        .map(|house| {
            let points = scores.get(&house).copied().unwrap_or(0);
            let scale = if points == 0 {
                0.0
            } else if range > 0.0 {
                base + interpolation * ((points as f64 - min_points) / range)
            } else {
                base + interpolation
            };
            (house, scale)
        })
        .collect()
}

/// Monospace house cup, one bar per house, ready to post in a code block.
pub fn render_cup(scores: &BTreeMap<House, i64>) -> String {
    let scales = calculate_scales(scores, BASE_RATIO);
    let name_width = House::ALL.iter().map(|h| h.name().len()).max().unwrap_or(0);

    let mut chart = String::from("```\n");
    for house in House::ALL {
        let scale = scales.get(&house).copied().unwrap_or(0.0).clamp(0.0, 1.0);
        let filled = (scale * BAR_WIDTH as f64).round() as usize;
        chart.push_str(&format!(
            "{:<width$} {}{} {}\n",
            house.name(),
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
            scores.get(&house).copied().unwrap_or(0),
            width = name_width,
        ));
    }
    chart.push_str("```");
    chart
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: [i64; 4]) -> BTreeMap<House, i64> {
        House::ALL.into_iter().zip(values).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_board_has_empty_bars() {
        let scales = calculate_scales(&scores([0, 0, 0, 0]), BASE_RATIO);
        assert!(scales.values().all(|s| *s == 0.0));
    }

    #[test]
    fn equal_scores_fill_equally() {
        let scales = calculate_scales(&scores([400, 400, 400, 400]), BASE_RATIO);
        let expected = 0.2 + ((400.0 / 1200.0) * 0.8_f64).max(0.4);
        assert!(scales.values().all(|s| close(*s, expected)));
    }

    #[test]
    fn leader_gets_the_tallest_bar() {
        let scales = calculate_scales(&scores([500, 600, 700, 1000]), BASE_RATIO);
        assert!(close(scales[&House::Slytherin], 0.25 + 0.625));
        assert!(close(scales[&House::Ravenclaw], 0.25));
        assert!(scales[&House::Gryffindor] > scales[&House::Hufflepuff]);
    }

    #[test]
    fn early_game_still_shows_a_minimum_spread() {
        let scales = calculate_scales(&scores([1, 10, 1, 20]), BASE_RATIO);
        assert!(close(scales[&House::Slytherin], 0.0005 + 0.4));
    }

    #[test]
    fn partial_board_uses_zero_floor() {
        let partial: BTreeMap<House, i64> = [(House::Gryffindor, 600)].into_iter().collect();
        let scales = calculate_scales(&partial, BASE_RATIO);
        assert!(close(scales[&House::Gryffindor], 0.5));
        assert_eq!(scales[&House::Ravenclaw], 0.0);
    }

    #[test]
    fn chart_lists_every_house_with_scores() {
        let chart = render_cup(&scores([1, 1200, 1, 1200]));
        assert!(chart.starts_with("```\n"));
        assert_eq!(chart.lines().count(), 6);
        assert!(chart.contains("Hufflepuff ████████████████████ 1200"));
    }
}
