//! Reference reconciliation against server-validated data.
//!
//! Three resolution procedures share one disambiguation pattern:
//! filter the candidate set, then branch on zero/one/many. Conditions the
//! operator can fix at a prompt (bad checksum, empty lookup, out-of-range
//! selection) loop instead of failing.

use console::style;

use fhc_client::{Building, InsuredPerson, Service};

use crate::error::{CliError, Result};
use crate::nif::validate_nif;
use crate::prompt::Prompter;

/// Resolve a business tax identifier to a unique building.
///
/// Loops until the identifier passes the checksum and the lookup returns at
/// least one building; the operator corrects the identifier in between.
/// Returns the selected building together with the identifier that actually
/// found it, which may differ from the one extracted from the receipt.
pub fn resolve_building(
    mut lookup: impl FnMut(&str) -> Result<Vec<Building>>,
    nif: &str,
    prompter: &mut dyn Prompter,
) -> Result<(Building, String)> {
    let mut nif = nif.to_string();

    loop {
        if !validate_nif(&nif) {
            println!(
                "{} '{nif}' fails the NIF check digit",
                style("Invalid business NIF:").yellow()
            );
            nif = prompter.input("Business NIF", Some(&nif))?;
            continue;
        }

        let buildings = lookup(&nif)?;
        if buildings.is_empty() {
            println!(
                "{} no building registered under {nif}",
                style("Not found:").yellow()
            );
            nif = prompter.input("Business NIF", Some(&nif))?;
            continue;
        }

        tracing::debug!(count = buildings.len(), %nif, "buildings matched");
        let building = select_one("building", buildings, |b| format!("{} - {}", b.name, b.address), prompter)?;
        return Ok((building, nif));
    }
}

/// Resolve the service to claim under, optionally narrowed by a name hint.
pub fn resolve_service(
    services: Vec<Service>,
    filter: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<Service> {
    let candidates = filter_candidates(services, filter, |service| &service.name);
    if candidates.is_empty() {
        return Err(CliError::NoServiceMatch(
            filter.unwrap_or_default().to_string(),
        ));
    }
    select_one("service", candidates, |service| service.name.clone(), prompter)
}

/// Resolve the insured person the claim is for.
pub fn resolve_person(
    persons: Vec<InsuredPerson>,
    filter: Option<&str>,
    prompter: &mut dyn Prompter,
) -> Result<InsuredPerson> {
    let candidates = filter_candidates(persons, filter, |person| &person.name);
    if candidates.is_empty() {
        return Err(CliError::NoPersonMatch(
            filter.unwrap_or_default().to_string(),
        ));
    }
    select_one("person", candidates, |person| person.name.clone(), prompter)
}

/// Case-insensitive substring filter; no filter keeps everything.
fn filter_candidates<T>(
    candidates: Vec<T>,
    filter: Option<&str>,
    name: impl Fn(&T) -> &str,
) -> Vec<T> {
    match filter {
        Some(filter) if !filter.is_empty() => {
            let needle = filter.to_lowercase();
            candidates
                .into_iter()
                .filter(|candidate| name(candidate).to_lowercase().contains(&needle))
                .collect()
        }
        _ => candidates,
    }
}

/// A single candidate is taken without prompting; multiple get a numbered
/// list, defaulting to 1 and re-prompting until the selection is in range.
fn select_one<T>(
    kind: &str,
    mut candidates: Vec<T>,
    display: impl Fn(&T) -> String,
    prompter: &mut dyn Prompter,
) -> Result<T> {
    if candidates.len() == 1 {
        return Ok(candidates.remove(0));
    }

    println!("Multiple {kind}s found:");
    for (i, candidate) in candidates.iter().enumerate() {
        println!("{}. {}", i + 1, display(candidate));
    }

    loop {
        let selection = prompter.select_number(&format!("Select {kind} number"), 1)?;
        if (1..=candidates.len()).contains(&selection) {
            return Ok(candidates.remove(selection - 1));
        }
        println!("Please enter a number between 1 and {}", candidates.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use pretty_assertions::assert_eq;

    fn building(id: &str, name: &str) -> Building {
        serde_json::from_str(&format!(
            r#"{{"id": "{id}", "name": "{name}", "address": "somewhere"}}"#
        ))
        .unwrap()
    }

    fn service(id: i64, name: &str) -> Service {
        serde_json::from_str(&format!(
            r#"{{"Id": {id}, "Name": "{name}", "IsMandatoryInvoiceFile": true, "IsMandatoryAditionalFile": false}}"#
        ))
        .unwrap()
    }

    fn person(card: &str, name: &str) -> InsuredPerson {
        serde_json::from_str(&format!(
            r#"{{"CardNumber": "{card}", "Name": "{name}", "Email": "{card}@example.com"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_building_single_match_auto_selects() {
        let mut prompter = ScriptedPrompter::new(&[], &[]);
        let (found, nif) = resolve_building(
            |_| Ok(vec![building("b1", "Hospital A")]),
            "123456789",
            &mut prompter,
        )
        .unwrap();
        assert_eq!(found.id, "b1");
        assert_eq!(nif, "123456789");
        assert!(prompter.input_prompts.is_empty());
        assert!(prompter.selection_prompts.is_empty());
    }

    #[test]
    fn test_building_invalid_nif_reprompts_exactly_once() {
        let mut prompter = ScriptedPrompter::new(&["123456789"], &[]);
        let (found, nif) = resolve_building(
            |_| Ok(vec![building("x", "x")]),
            "invalid",
            &mut prompter,
        )
        .unwrap();
        assert_eq!(prompter.input_prompts.len(), 1);
        assert_eq!(found.id, "x");
        assert_eq!(nif, "123456789");
    }

    #[test]
    fn test_building_empty_lookup_reprompts_for_new_nif() {
        let mut lookups: Vec<Vec<Building>> = vec![vec![], vec![building("x", "x")]];
        let mut seen = Vec::new();
        let mut prompter = ScriptedPrompter::new(&["505956985"], &[]);

        let (found, nif) = resolve_building(
            |nif| {
                seen.push(nif.to_string());
                Ok(lookups.remove(0))
            },
            "123456789",
            &mut prompter,
        )
        .unwrap();

        assert_eq!(prompter.input_prompts.len(), 1);
        assert_eq!(seen, vec!["123456789", "505956985"]);
        assert_eq!(found.id, "x");
        assert_eq!(nif, "505956985");
    }

    #[test]
    fn test_building_multiple_matches_numbered_selection() {
        let mut prompter = ScriptedPrompter::new(&[], &[2]);
        let (found, _) = resolve_building(
            |_| Ok(vec![building("b1", "Hospital A"), building("b2", "Hospital B")]),
            "123456789",
            &mut prompter,
        )
        .unwrap();
        assert_eq!(found.id, "b2");
    }

    #[test]
    fn test_building_out_of_range_selection_reprompts() {
        let mut prompter = ScriptedPrompter::new(&[], &[7, 0, 1]);
        let (found, _) = resolve_building(
            |_| Ok(vec![building("b1", "Hospital A"), building("b2", "Hospital B")]),
            "123456789",
            &mut prompter,
        )
        .unwrap();
        assert_eq!(prompter.selection_prompts.len(), 3);
        assert_eq!(found.id, "b1");
    }

    #[test]
    fn test_service_filter_to_single_auto_selects() {
        let mut prompter = ScriptedPrompter::new(&[], &[]);
        let found = resolve_service(
            vec![service(1, "Medical Service"), service(2, "Dental Service")],
            Some("medical"),
            &mut prompter,
        )
        .unwrap();
        assert_eq!(found.id, 1);
        assert!(prompter.selection_prompts.is_empty());
    }

    #[test]
    fn test_service_no_match_fails() {
        let mut prompter = ScriptedPrompter::new(&[], &[]);
        let err = resolve_service(
            vec![service(1, "Medical Service")],
            Some("NonExistent"),
            &mut prompter,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::NoServiceMatch(f) if f == "NonExistent"));
    }

    #[test]
    fn test_service_multiple_matches_interactive() {
        let mut prompter = ScriptedPrompter::new(&[], &[1]);
        let found = resolve_service(
            vec![service(1, "Medical Service A"), service(2, "Medical Service B")],
            None,
            &mut prompter,
        )
        .unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_person_filter_and_selection() {
        let mut prompter = ScriptedPrompter::new(&[], &[2]);
        let found = resolve_person(
            vec![person("111", "John Doe"), person("222", "Jane Smith")],
            None,
            &mut prompter,
        )
        .unwrap();
        assert_eq!(found.card_number, "222");
    }

    #[test]
    fn test_person_no_match_fails() {
        let mut prompter = ScriptedPrompter::new(&[], &[]);
        let err = resolve_person(vec![person("111", "John Doe")], Some("Nobody"), &mut prompter)
            .unwrap_err();
        assert!(matches!(err, CliError::NoPersonMatch(_)));
    }

    #[test]
    fn test_cancelled_selection_aborts() {
        // Script runs dry on the numbered selection.
        let mut prompter = ScriptedPrompter::new(&[], &[]);
        let err = resolve_person(
            vec![person("111", "John Doe"), person("222", "Jane Smith")],
            None,
            &mut prompter,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::SelectionCancelled(_)));
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let kept = filter_candidates(
            vec![service(1, "Consulta Medicina"), service(2, "Fisioterapia")],
            Some("MEDIC"),
            |s| &s.name,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }
}
