use owo_colors::OwoColorize;

pub struct CommandSummary {
    pub prefix: String,
    pub message: String,
}

impl CommandSummary {
    /// インポート結果の最終行
    pub fn format(success: usize, failure: usize, cards: usize) -> Self {
        match (success, failure) {
            (_, f) if f > 0 => Self {
                prefix: "✗".red().to_string(),
                message: format!("{} succeeded, {} failed", success.green(), f.red()),
            },
            (s, _) if s > 0 => Self {
                prefix: "✓".green().to_string(),
                message: format!("{} card(s) imported from {} importer(s)", cards.green(), s),
            },
            _ => Self {
                prefix: "•".yellow().to_string(),
                message: "No active importers".to_string(),
            },
        }
    }
}

impl std::fmt::Display for CommandSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.prefix, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_takes_precedence() {
        let summary = CommandSummary::format(2, 1, 5);
        assert!(summary.message.contains("succeeded"));
        assert!(summary.message.contains("failed"));
    }

    #[test]
    fn test_success_reports_cards() {
        let summary = CommandSummary::format(1, 0, 3);
        assert!(summary.message.contains("card(s) imported"));
    }

    #[test]
    fn test_nothing_ran() {
        let summary = CommandSummary::format(0, 0, 0);
        assert_eq!(summary.message, "No active importers");
    }
}
