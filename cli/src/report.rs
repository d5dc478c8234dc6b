use imgstream_core::Outcome;

/// Aggregate report for one batch run.
pub struct Report {
    pub results: Vec<Outcome>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, outcome: Outcome) {
        self.results.push(outcome);
    }

    pub fn total_initial(&self) -> u64 {
        self.results
            .iter()
            .filter_map(|o| match o {
                Outcome::Converted { initial_size, .. } => Some(*initial_size),
                Outcome::Failed { .. } => None,
            })
            .sum()
    }

    pub fn total_compressed(&self) -> u64 {
        self.results
            .iter()
            .filter_map(|o| match o {
                Outcome::Converted {
                    compressed_size, ..
                } => Some(*compressed_size),
                Outcome::Failed { .. } => None,
            })
            .sum()
    }

    pub fn total_savings_pct(&self) -> f64 {
        let initial = self.total_initial();
        if initial == 0 {
            return 0.0;
        }
        (1.0 - self.total_compressed() as f64 / initial as f64) * 100.0
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|o| o.is_failure()).count()
    }

    pub fn print_summary(&self) {
        println!("\n--- Summary ---");
        println!(
            "Files converted: {} | Errors: {}",
            self.success_count(),
            self.error_count()
        );

        if self.success_count() > 0 {
            println!(
                "Total: {} → {} ({:.1}% reduction)",
                format_size(self.total_initial()),
                format_size(self.total_compressed()),
                self.total_savings_pct()
            );
        }

        for outcome in &self.results {
            if let Outcome::Failed { name, reason } = outcome {
                println!("  ERROR {name}: {reason}");
            }
        }
    }
}

/// Per-item saving, for the progress bar message.
pub fn savings_pct(initial: u64, compressed: u64) -> f64 {
    if initial == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / initial as f64) * 100.0
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
