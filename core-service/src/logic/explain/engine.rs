use super::types::{Impact, TopFactor};
use crate::logic::features::layout::FEATURE_LAYOUT;
use crate::logic::features::ApplicationInput;

/// Max factors reported per prediction
pub const TOP_FACTOR_COUNT: usize = 5;

pub const HIGH_IMPACT_ABOVE: f32 = 0.10;
pub const MEDIUM_IMPACT_ABOVE: f32 = 0.05;

pub fn impact_of(importance: f32) -> Impact {
    if importance > HIGH_IMPACT_ABOVE {
        Impact::High
    } else if importance > MEDIUM_IMPACT_ABOVE {
        Impact::Medium
    } else {
        Impact::Low
    }
}

/// Indices of the `n` largest importances, descending, ties by index.
/// Non-finite entries are skipped.
pub fn rank_features(importances: &[f32], n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = importances
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();

    if ranked.len() < importances.len() {
        log::warn!(
            "Skipped {} non-finite feature importances",
            importances.len() - ranked.len()
        );
    }

    // Stable sort keeps layout order among equal importances
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}

/// Top factors for `input`; empty when the model has no importances
pub fn explain(importances: Option<&[f32]>, input: &ApplicationInput) -> Vec<TopFactor> {
    let Some(importances) = importances else {
        return Vec::new();
    };

    let usable = if importances.len() != FEATURE_LAYOUT.len() {
        log::warn!(
            "{} importances for {} features; using the first {}",
            importances.len(),
            FEATURE_LAYOUT.len(),
            importances.len().min(FEATURE_LAYOUT.len())
        );
        &importances[..importances.len().min(FEATURE_LAYOUT.len())]
    } else {
        importances
    };

    rank_features(usable, TOP_FACTOR_COUNT)
        .into_iter()
        .filter_map(|i| {
            let name = FEATURE_LAYOUT.get(i)?;
            let importance = usable[i];
            Some(TopFactor {
                feature: name.to_string(),
                value: input.display_value(name)?,
                importance,
                impact: impact_of(importance),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_six_importances() {
        let ranked = rank_features(&[0.3, 0.2, 0.05, 0.02, 0.01, 0.4], 5);
        assert_eq!(ranked, vec![5, 0, 1, 2, 3]);
    }

    #[test]
    fn test_impacts_for_six_importances() {
        let importances = [0.3f32, 0.2, 0.05, 0.02, 0.01, 0.4];
        let impacts: Vec<Impact> = rank_features(&importances, 5)
            .into_iter()
            .map(|i| impact_of(importances[i]))
            .collect();
        assert_eq!(
            impacts,
            vec![Impact::High, Impact::High, Impact::High, Impact::Low, Impact::Low]
        );
    }

    #[test]
    fn test_impact_boundaries() {
        assert_eq!(impact_of(0.11), Impact::High);
        assert_eq!(impact_of(0.10), Impact::Medium);
        assert_eq!(impact_of(0.06), Impact::Medium);
        assert_eq!(impact_of(0.05), Impact::Low);
        assert_eq!(impact_of(0.0), Impact::Low);
    }

    #[test]
    fn test_ties_keep_feature_order() {
        let ranked = rank_features(&[0.1, 0.2, 0.1, 0.2, 0.1], 3);
        assert_eq!(ranked, vec![1, 3, 0]);
    }

    #[test]
    fn test_nan_entries_skipped() {
        let ranked = rank_features(&[f32::NAN, 0.5, 0.1], 5);
        assert_eq!(ranked, vec![1, 2]);
    }

    #[test]
    fn test_explain_without_importances() {
        assert!(explain(None, &ApplicationInput::default()).is_empty());
    }

    #[test]
    fn test_explain_reports_values() {
        let mut importances = vec![0.0f32; FEATURE_LAYOUT.len()];
        importances[0] = 0.4; // loan_amnt
        importances[4] = 0.2; // grade
        let factors = explain(Some(&importances), &ApplicationInput::default());

        assert_eq!(factors.len(), 5);
        assert_eq!(factors[0].feature, "loan_amnt");
        assert_eq!(factors[0].value, "10000.0");
        assert_eq!(factors[0].impact, Impact::High);
        assert_eq!(factors[1].feature, "grade");
        assert_eq!(factors[1].value, "A");
        // Remaining zero-importance slots follow layout order
        assert_eq!(factors[2].feature, "term");
    }

    #[test]
    fn test_short_importances_truncate() {
        let factors = explain(Some(&[0.3, 0.2]), &ApplicationInput::default());
        assert_eq!(factors.len(), 2);
        assert_eq!(factors[0].feature, "loan_amnt");
    }

    #[test]
    fn test_impact_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Impact::Medium).unwrap(), "\"MEDIUM\"");
    }
}
