// Text extraction - turn a raw register export into structured records
//
// The export is free text: a header block naming the taxpayer and the
// period, then one row per insured person, then a totals line. Header
// fields are matched on the raw text; person rows are matched on a
// whitespace-normalized copy in a single linear pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::person::{Meta, Person};

static TAXPAYER_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Emri i Tatimpaguesit:\s*([\w\s]+?)\s*3\)").expect("taxpayer name pattern")
});

static MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Muaji:\s*(\w+)").expect("month pattern"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// A record opens with a sequence number and a 10-character id token,
/// each on a token boundary.
static RECORD_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(\d+)\s+(\w{10})\s").expect("record start pattern"));

/// The register closes with a totals line; record content never crosses it.
static TOTALS_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+Totali i Listepageses").expect("totals marker pattern"));

/// Parse a raw register export into header metadata and the ordered
/// person list. Total over all inputs: missing headers fall back to the
/// default metadata, and text with no recognizable rows yields an empty
/// list.
pub fn parse_document(text: &str) -> (Meta, Vec<Person>) {
    (extract_meta(text), extract_people(text))
}

fn extract_meta(text: &str) -> Meta {
    let name = TAXPAYER_NAME_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(Meta::default_name);
    let month = MONTH_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(Meta::default_month);
    Meta { name, month }
}

fn extract_people(text: &str) -> Vec<Person> {
    let normalized = WHITESPACE_RE.replace_all(text, " ");
    let normalized = normalized.trim();

    // (record begin, content begin, id) for every record opener, in
    // order of appearance.
    let starts: Vec<(usize, usize, &str)> = RECORD_START_RE
        .captures_iter(normalized)
        .map(|caps| {
            let seq = caps.get(1).expect("sequence group");
            let id = caps.get(2).expect("id group");
            (seq.start(), id.end(), id.as_str())
        })
        .collect();

    let markers: Vec<usize> = TOTALS_MARKER_RE
        .find_iter(normalized)
        .map(|m| m.start())
        .collect();

    let mut people = Vec::with_capacity(starts.len());
    for (i, &(_, content_start, id)) in starts.iter().enumerate() {
        let next_start = starts.get(i + 1).map(|&(begin, _, _)| begin);
        let marker = markers.iter().copied().find(|&m| m >= content_start);
        let content_end = match (next_start, marker) {
            (Some(n), Some(m)) => n.min(m),
            (Some(n), None) => n,
            (None, Some(m)) => m,
            // A trailing record with neither a following record nor the
            // totals marker after it is dropped, as in the source format
            // contract.
            (None, None) => continue,
        };
        let content = normalized[content_start..content_end].trim();
        if content.is_empty() {
            continue;
        }
        let (name, numbers) = split_name_and_numbers(content);
        people.push(Person::from_tokens(id, &name, &numbers));
    }
    people
}

/// Split a record's content tokens into the leading name run and the
/// trailing numbers run. The numbers run starts at the first token that
/// opens with a digit.
fn split_name_and_numbers(content: &str) -> (String, Vec<&str>) {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    match tokens
        .iter()
        .position(|t| t.starts_with(|c: char| c.is_ascii_digit()))
    {
        Some(first_number) => (
            tokens[..first_number].join(" "),
            tokens[first_number..].to_vec(),
        ),
        None => (tokens.join(" "), Vec::new()),
    }
}
