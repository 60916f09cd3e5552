use anyhow::Result;
use colored::Colorize;
use dynamic_rules::{DraftAction, PassKind, RoundReport, RuleTally};
use std::io::Write;
use std::time::Duration;

use super::{PlayerAggregate, SimulationRecord};

/// Round-end line for one executed ruleset, e.g. `Traitor (x2) - 12 threat`.
pub fn format_tally(tally: &RuleTally) -> String {
    format!("{} (x{}) - {} threat", tally.name, tally.count, tally.cost)
}

fn pass_label(kind: PassKind) -> &'static str {
    match kind {
        PassKind::Roundstart => "roundstart",
        PassKind::Midround => "midround",
    }
}

fn write_round_end_text<W: Write + ?Sized>(out: &mut W, report: &RoundReport) -> Result<()> {
    writeln!(out, "   Total threat: {} points", report.points.total)?;
    writeln!(out, "   Roundstart: {} points", report.points.roundstart)?;
    writeln!(out, "   Midround: {} points", report.points.midround)?;
    if report.executed.is_empty() {
        writeln!(out, "   No rulesets executed.")?;
    } else {
        writeln!(out, "   Executed rulesets:")?;
        for tally in &report.executed.rules {
            writeln!(out, "     • {}", format_tally(tally))?;
        }
    }
    Ok(())
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    records: &[SimulationRecord],
    aggregates: &[PlayerAggregate],
    verbose: bool,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Dynamic Threat Results".bright_cyan().bold())?;
    writeln!(out, "{}", "=========================".cyan())?;
    writeln!(out, "Simulations: {}", records.len())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for record in records {
        writeln!(
            out,
            "{} seed {} · {} players",
            "🎲".bold(),
            record.seed.to_string().bold(),
            record.players.to_string().bold()
        )?;
        write_round_end_text(out, &record.report)?;

        if verbose {
            for instance in &record.instances {
                writeln!(
                    out,
                    "   Instance {} ({} rng draws)",
                    instance.index, instance.rng_draws
                )?;
                for pass in &instance.passes {
                    writeln!(
                        out,
                        "     {} pass: spent {:.2}, leftover {:.2}",
                        pass_label(pass.kind),
                        pass.outcome.spent,
                        pass.outcome.leftover
                    )?;
                    for step in &pass.outcome.steps {
                        let line = match step.action {
                            DraftAction::Activated { cost } => {
                                format!("+ {} for {cost:.2}", step.candidate_id).green()
                            }
                            DraftAction::Unaffordable { cost } => {
                                format!("x {} needs {cost:.2}", step.candidate_id).red()
                            }
                        };
                        writeln!(
                            out,
                            "       {line} (roll {:.2}/{:.2})",
                            step.roll, step.total_weight
                        )?;
                    }
                }
            }
        }
        writeln!(out)?;
    }

    if !aggregates.is_empty() {
        writeln!(out, "{}", "⚡ Player Count Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "======================".yellow())?;
        for aggregate in aggregates {
            let top = aggregate.most_drafted().map_or_else(
                || "none".to_string(),
                |(name, count)| format!("{name} (x{count})"),
            );
            writeln!(
                out,
                "{:>4} players: mean threat {:.1}, mean activations {:.1}, most drafted {}",
                aggregate.players,
                aggregate.mean_threat,
                aggregate.mean_activations,
                top.green()
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    records: &[SimulationRecord],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(records)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    records: &[SimulationRecord],
    aggregates: &[PlayerAggregate],
) -> Result<()> {
    writeln!(out, "# Dynamic Threat Simulation\n")?;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "| Players | Runs | Mean threat | Mean activations | Most drafted |")?;
    writeln!(out, "|---:|---:|---:|---:|---|")?;
    for aggregate in aggregates {
        let top = aggregate
            .most_drafted()
            .map_or_else(|| "-".to_string(), |(name, count)| format!("{name} (x{count})"));
        writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {top} |",
            aggregate.players, aggregate.runs, aggregate.mean_threat, aggregate.mean_activations
        )?;
    }
    writeln!(out)?;

    writeln!(out, "## Rounds\n")?;
    for record in records {
        writeln!(out, "### Seed {} · {} players\n", record.seed, record.players)?;
        writeln!(out, "- **Total threat**: {}", record.report.points.total)?;
        writeln!(out, "- **Roundstart**: {}", record.report.points.roundstart)?;
        writeln!(out, "- **Midround**: {}", record.report.points.midround)?;
        if !record.report.executed.is_empty() {
            writeln!(out, "- **Executed rulesets**:")?;
            for tally in &record.report.executed.rules {
                writeln!(out, "  - {}", format_tally(tally))?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{DynamicSimulation, SimulationSettings, aggregate_by_players};
    use dynamic_rules::{DynamicConfig, RulesetData};

    fn sample_records() -> Vec<SimulationRecord> {
        let catalog = RulesetData::load_from_static();
        let sim = DynamicSimulation::new(
            &catalog,
            DynamicConfig::default(),
            SimulationSettings::default(),
        );
        sim.run_matrix(&[1, 2], &[40]).unwrap()
    }

    #[test]
    fn tally_lines_match_round_end_format() {
        let tally = RuleTally {
            name: "Traitor".to_string(),
            count: 2,
            cost: 12.0,
        };
        assert_eq!(format_tally(&tally), "Traitor (x2) - 12 threat");
    }

    #[test]
    fn json_report_round_trips_record_count() {
        let records = sample_records();
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &records).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
        assert!(parsed[0]["report"]["points"]["total"].is_i64());
    }

    #[test]
    fn markdown_report_lists_every_seed() {
        let records = sample_records();
        let aggregates = aggregate_by_players(&records);
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &records, &aggregates).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# Dynamic Threat Simulation"));
        assert!(text.contains("### Seed 1 · 40 players"));
        assert!(text.contains("### Seed 2 · 40 players"));
        assert!(text.contains("| 40 | 2 |"));
    }

    #[test]
    fn console_report_includes_steps_when_verbose() {
        colored::control::set_override(false);
        let records = sample_records();
        let aggregates = aggregate_by_players(&records);
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &records, &aggregates, true, Duration::ZERO).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Dynamic Threat Results"));
        assert!(text.contains("roundstart pass"));
        assert!(text.contains("Player Count Summary"));
    }
}
