use anyhow::Result;
use serde_json::Value;

use threatdigest_core::digest::DigestRecord;

pub fn print_json(record: &DigestRecord) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Human-readable digest for the terminal
pub fn print_digest(record: &DigestRecord) {
    println!("Digest generated {}", record.timestamp.format("%Y-%m-%d %H:%M UTC"));
    println!("  Sources: {}  Articles: {}", record.sources_count, record.article_count);

    if let Some(error) = &record.error {
        println!("  [ERROR: {}]", error);
    }

    if let Some(summary) = record.executive_summary() {
        println!("\nExecutive summary\n\n{}", summary);
    }

    if let Some(Value::Array(threats)) = record.summary.get("critical_threats") {
        if !threats.is_empty() {
            println!("\nCritical threats");
            for threat in threats {
                let title = threat.get("title").and_then(Value::as_str).unwrap_or("(untitled)");
                let severity = threat.get("severity").and_then(Value::as_str).unwrap_or("?");
                println!("  [{}] {}", severity, title);
                if let Some(rec) = threat.get("recommendation").and_then(Value::as_str) {
                    println!("      -> {}", rec);
                }
            }
        }
    }

    if let Some(Value::Array(topics)) = record.summary.get("trending_topics") {
        let topics: Vec<&str> = topics.iter().filter_map(Value::as_str).collect();
        if !topics.is_empty() {
            println!("\nTrending: {}", topics.join(", "));
        }
    }

    if let Some(Value::Object(categories)) = record.summary.get("categories") {
        for (name, text) in categories {
            if let Some(text) = text.as_str() {
                println!("\n{}\n  {}", name, text);
            }
        }
    }

    if let Some(Value::Array(recs)) = record.summary.get("key_recommendations") {
        if !recs.is_empty() {
            println!("\nKey recommendations");
            for rec in recs.iter().filter_map(Value::as_str) {
                println!("  - {}", rec);
            }
        }
    }

    if !record.articles.is_empty() {
        println!("\nArticles");
        for item in &record.articles {
            println!("  {} ({})", item.title, item.source_label);
            if !item.link.is_empty() {
                println!("    {}", item.link);
            }
        }
    }
}
