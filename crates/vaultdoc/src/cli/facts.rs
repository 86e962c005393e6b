//! `vaultdoc facts`: print the documented contract catalog.

use anyhow::{Context as _, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use vaultdoc::suite::documentation_example_facts;
use vaultdoc_protocol::catalog::{contract_facts, endpoint};
use vaultdoc_protocol::{ContractFact, FactKind};

pub struct FactsArgs {
    pub json: bool,
}

pub fn run(args: FactsArgs) -> Result<u8> {
    let mut facts = contract_facts();
    facts.extend(documentation_example_facts());

    if args.json {
        let json = serde_json::to_string_pretty(&facts).context("Failed to serialize facts")?;
        println!("{}", json);
    } else {
        print_facts(&facts);
    }
    Ok(0)
}

fn print_facts(facts: &[ContractFact]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Kind", "Subject", "Check", "Documents"]
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for fact in facts {
        table.add_row(vec![
            fact.kind.as_str(),
            fact.subject.as_str(),
            fact.label.as_str(),
            documents(fact),
        ]);
    }
    println!("{}", table);
    println!("{} documented facts", facts.len());
}

/// Endpoint summary for method and call-shape facts
fn documents(fact: &ContractFact) -> &'static str {
    match fact.kind {
        FactKind::MethodPresence | FactKind::ParameterShape => {
            endpoint(&fact.subject).map(|e| e.summary).unwrap_or("")
        }
        FactKind::ConstructorOption => "client construction",
        FactKind::ExceptionType => "error handling",
    }
}
