// Chart state
//
// Two derived views: a fixed-width sliding window of attack probability
// samples and the server-reported attack category distribution.

use std::collections::{HashMap, VecDeque};

/// Number of probability samples shown in the time-series chart
pub const CHART_WINDOW: usize = 50;

/// Samples strictly above this value switch the series to the alert palette
pub const ALERT_THRESHOLD: f64 = 0.35;

/// Presentation palette of the probability series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartPalette {
    #[default]
    Normal,
    Alert,
}

impl ChartPalette {
    /// Pure function of the latest sample; no hysteresis
    pub fn for_sample(p: f64) -> Self {
        if p > ALERT_THRESHOLD {
            ChartPalette::Alert
        } else {
            ChartPalette::Normal
        }
    }
}

/// Fixed-length sliding window of samples, zero-filled at start
#[derive(Debug, Clone)]
pub struct ChartSeries {
    samples: VecDeque<f64>,
    palette: ChartPalette,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::with_window(CHART_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            samples: std::iter::repeat(0.0).take(window).collect(),
            palette: ChartPalette::Normal,
        }
    }

    /// Drop the oldest sample and append `p`; the window length never changes
    pub fn push_sample(&mut self, p: f64) {
        if self.samples.is_empty() {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(p);
        self.palette = ChartPalette::for_sample(p);
    }

    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn palette(&self) -> ChartPalette {
        self.palette
    }
}

impl Default for ChartSeries {
    fn default() -> Self {
        Self::new()
    }
}

/// Attack categories in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackCategory {
    Ddos,
    BruteForce,
    Malware,
    Other,
}

impl AttackCategory {
    pub const ALL: [AttackCategory; 4] = [
        AttackCategory::Ddos,
        AttackCategory::BruteForce,
        AttackCategory::Malware,
        AttackCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AttackCategory::Ddos => "DDoS",
            AttackCategory::BruteForce => "Brute Force",
            AttackCategory::Malware => "Malware",
            AttackCategory::Other => "Other",
        }
    }

    /// Keys accepted for this category in the stats payload
    fn wire_keys(&self) -> &'static [&'static str] {
        match self {
            AttackCategory::Ddos => &["DDoS"],
            AttackCategory::BruteForce => &["Brute Force", "BruteForce"],
            AttackCategory::Malware => &["Malware"],
            AttackCategory::Other => &["Other"],
        }
    }
}

/// Server-reported totals per category, fully replaced on every refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionCounts {
    counts: [u64; 4],
}

impl DistributionCounts {
    /// Build counts from the wire map; missing categories count as zero
    pub fn from_wire(attack_types: &HashMap<String, u64>) -> Self {
        let mut counts = [0u64; 4];
        for (slot, category) in counts.iter_mut().zip(AttackCategory::ALL) {
            *slot = category
                .wire_keys()
                .iter()
                .find_map(|key| attack_types.get(*key).copied())
                .unwrap_or(0);
        }
        Self { counts }
    }

    /// Counts in the fixed order DDoS, Brute Force, Malware, Other
    pub fn as_array(&self) -> [u64; 4] {
        self.counts
    }

    pub fn get(&self, category: AttackCategory) -> u64 {
        // Variants are declared in display order
        self.as_array()[category as usize]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Both chart views, owned by the session state
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    pub series: ChartSeries,
    pub distribution: DistributionCounts,
}

impl ChartState {
    pub fn push_sample(&mut self, p: f64) {
        self.series.push_sample(p);
    }

    pub fn set_distribution(&mut self, attack_types: &HashMap<String, u64>) {
        self.distribution = DistributionCounts::from_wire(attack_types);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wire(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_series_starts_zero_filled() {
        let series = ChartSeries::new();
        assert_eq!(series.samples().count(), CHART_WINDOW);
        assert!(series.samples().all(|s| s == 0.0));
        assert_eq!(series.palette(), ChartPalette::Normal);
    }

    #[test]
    fn test_palette_boundary() {
        assert_eq!(ChartPalette::for_sample(0.35), ChartPalette::Normal);
        assert_eq!(ChartPalette::for_sample(0.3500001), ChartPalette::Alert);
        assert_eq!(ChartPalette::for_sample(0.0), ChartPalette::Normal);
        assert_eq!(ChartPalette::for_sample(1.0), ChartPalette::Alert);
    }

    #[test]
    fn test_palette_has_no_hysteresis() {
        let mut series = ChartSeries::new();
        series.push_sample(0.9);
        assert_eq!(series.palette(), ChartPalette::Alert);
        series.push_sample(0.1);
        assert_eq!(series.palette(), ChartPalette::Normal);
    }

    #[test]
    fn test_distribution_partial_payload() {
        let counts = DistributionCounts::from_wire(&wire(&[("DDoS", 3), ("Other", 1)]));
        assert_eq!(counts.as_array(), [3, 0, 0, 1]);
    }

    #[test]
    fn test_distribution_wire_key_with_space() {
        let counts = DistributionCounts::from_wire(&wire(&[("Brute Force", 7), ("Malware", 2)]));
        assert_eq!(counts.as_array(), [0, 7, 2, 0]);
        assert_eq!(counts.get(AttackCategory::BruteForce), 7);
        assert_eq!(counts.total(), 9);
    }

    #[test]
    fn test_distribution_is_replaced_not_accumulated() {
        let mut state = ChartState::default();
        state.set_distribution(&wire(&[("DDoS", 5), ("Malware", 4)]));
        state.set_distribution(&wire(&[("DDoS", 6)]));
        assert_eq!(state.distribution.as_array(), [6, 0, 0, 0]);
    }

    #[test]
    fn test_distribution_ignores_unknown_categories() {
        let counts = DistributionCounts::from_wire(&wire(&[("Phishing", 9)]));
        assert_eq!(counts.as_array(), [0, 0, 0, 0]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Window length is invariant, the last sample is the pushed one and
        /// the palette tracks the threshold
        #[test]
        fn prop_sliding_window(samples in proptest::collection::vec(0.0f64..=1.0, 0..150)) {
            let mut series = ChartSeries::new();
            for &p in &samples {
                series.push_sample(p);
                prop_assert_eq!(series.samples().count(), CHART_WINDOW);
                prop_assert_eq!(series.latest(), Some(p));
                prop_assert_eq!(series.palette() == ChartPalette::Alert, p > ALERT_THRESHOLD);
            }

            // Window holds the last CHART_WINDOW samples, zero-padded on the left
            let window: Vec<f64> = series.samples().collect();
            let tail = &samples[samples.len().saturating_sub(CHART_WINDOW)..];
            prop_assert_eq!(&window[CHART_WINDOW - tail.len()..], tail);
        }
    }
}
