use serde::Deserialize;

use smilescanon::canonical_smiles;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Approval {
    groups: Vec<Group>,
    distinct: Vec<[String; 2]>,
    rejected: Vec<String>,
}

/// Spellings of one molecule, all expected to canonicalize alike.
#[derive(Deserialize)]
struct Group {
    name: String,
    canonical: Option<String>,
    inputs: Vec<String>,
}

fn load() -> Approval {
    serde_json::from_str(include_str!("approval_data/canonical.json")).unwrap()
}

fn report(kind: &str, failures: Vec<String>) {
    if !failures.is_empty() {
        panic!("{} {kind} failures:\n{}", failures.len(), failures.join("\n"));
    }
}

// ---------------------------------------------------------------------------
// 1. Equivalent spellings
// ---------------------------------------------------------------------------

#[test]
fn approval_equivalent_spellings() {
    let mut failures = Vec::new();
    for group in &load().groups {
        let outputs: Vec<String> = group.inputs.iter().map(|s| canonical_smiles(s)).collect();
        let expected = group.canonical.clone().unwrap_or_else(|| outputs[0].clone());

        if expected.is_empty() {
            failures.push(format!("[{}] {:?} was rejected", group.name, group.inputs[0]));
            continue;
        }
        for (input, got) in group.inputs.iter().zip(&outputs) {
            if *got != expected {
                failures.push(format!(
                    "[{}] {input}: expected {expected:?}, got {got:?}",
                    group.name
                ));
            }
        }
    }
    report("equivalence", failures);
}

// ---------------------------------------------------------------------------
// 2. Idempotence of the approved outputs
// ---------------------------------------------------------------------------

#[test]
fn approval_outputs_are_fixed_points() {
    let mut failures = Vec::new();
    for group in &load().groups {
        for input in &group.inputs {
            let once = canonical_smiles(input);
            let twice = canonical_smiles(&once);
            if once != twice {
                failures.push(format!("[{}] {input}: {once:?} -> {twice:?}", group.name));
            }
        }
    }
    report("idempotence", failures);
}

// ---------------------------------------------------------------------------
// 3. Different molecules stay different
// ---------------------------------------------------------------------------

#[test]
fn approval_distinct_molecules() {
    let mut failures = Vec::new();
    for [a, b] in &load().distinct {
        let (ca, cb) = (canonical_smiles(a), canonical_smiles(b));
        if ca.is_empty() || cb.is_empty() || ca == cb {
            failures.push(format!("{a} -> {ca:?}, {b} -> {cb:?}"));
        }
    }
    report("distinctness", failures);
}

// ---------------------------------------------------------------------------
// 4. Rejected inputs
// ---------------------------------------------------------------------------

#[test]
fn approval_rejected_inputs() {
    let failures: Vec<String> = load()
        .rejected
        .iter()
        .filter_map(|input| {
            let got = canonical_smiles(input);
            (!got.is_empty()).then(|| format!("{input:?}: expected rejection, got {got:?}"))
        })
        .collect();
    report("rejection", failures);
}
