use crate::analysis::confidence::ConfidenceCategory;
use crate::analysis::recommender::Recommendation;
use crate::composition::Composition;
use crate::engine::EngineStatus;
use crate::store::FeedbackSummary;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct BuildRow {
    rank: String,
    spec: String,
    role: String,
    count: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
}

#[derive(Tabled)]
struct FeedbackRow {
    composition: String,
    total: String,
    worked: String,
    #[tabled(rename = "success rate")]
    success_rate: String,
}

pub fn display_recommendation(recommendation: &Recommendation, enemy: &Composition) {
    println!(
        "\n{}",
        format!("⚔️  Counter Recommendation vs {}", enemy).bold().cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if recommendation.entries.is_empty() {
        println!("{}", "No builds to recommend (empty candidate pool)".yellow());
        return;
    }

    let mut rows = vec![];
    for (idx, entry) in recommendation.entries.iter().enumerate() {
        rows.push(BuildRow {
            rank: format!("#{}", idx + 1),
            spec: entry.spec.clone(),
            role: entry.role.label().to_string(),
            count: format!("{}x", entry.count),
            win_rate: if entry.win_rate > 0.0 {
                format!("{:.1}%", entry.win_rate)
            } else {
                "-".to_string()
            },
        });
    }

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let needs = &recommendation.needs;
    println!("\n{}", "Tactical Needs".bold().yellow());
    println!(
        "  strip {:.2}  heal {:.2}  stab {:.2}  boon {:.2}  burst {:.2}",
        needs.strip, needs.heal, needs.stab, needs.boon, needs.burst
    );

    if !recommendation.tags.is_empty() {
        println!("\n{}", "Reads".bold().yellow());
        for tag in &recommendation.tags {
            println!("  • {}", tag);
        }
    }

    let confidence = &recommendation.confidence;
    let category = match confidence.category {
        ConfidenceCategory::High => confidence.category.to_string().green(),
        ConfidenceCategory::Medium => confidence.category.to_string().yellow(),
        ConfidenceCategory::Low => confidence.category.to_string().red(),
    };
    println!(
        "\n{} {:.0}% ({}) from {} similar fights",
        "Confidence:".bold(),
        confidence.score,
        category,
        recommendation.similar_fights
    );
    if recommendation.similar_fights == 0 {
        println!(
            "{}",
            "  No matching history yet - recommendation is needs-coverage only".yellow()
        );
    }
    println!();
}

pub fn display_status(status: &EngineStatus, feedback: &[FeedbackSummary]) {
    println!("\n{}", "📊 Engine Status".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
    println!("  Fights recorded:  {}", status.total_fights);
    println!("  Global win rate:  {:.1}%", status.global_win_rate);
    println!("  Unique players:   {}", status.unique_players);
    println!("  Engine:           {}", status.engine);

    if !feedback.is_empty() {
        println!("\n{}", "Feedback by composition".bold().yellow());
        let rows: Vec<FeedbackRow> = feedback
            .iter()
            .map(|f| FeedbackRow {
                composition: f.signature.clone(),
                total: f.total.to_string(),
                worked: f.worked.to_string(),
                success_rate: format!("{:.0}%", f.success_rate * 100.0),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}
