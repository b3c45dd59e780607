//! CSV cache files
//!
//! Fields are separated by `;`, records are terminated by `\r`. An empty field stands for an absent optional value.
//! This layout has no column for the text color, which is therefore not kept in CSV files.

use super::{ItemRecord, Parsed};
use crate::item::Item;
use crate::timestamp::Timestamp;

const SEPARATOR: char = ';';
const TERMINATOR: char = '\r';
const COLUMNS: [&str; 7] = ["id", "text", "importance", "deadline", "isDone", "creationDate", "modificationDate"];

/// Serialize items into CSV
pub fn build(items: &[Item]) -> String {
    let mut out = String::new();
    out.push_str(&COLUMNS.join(";"));
    out.push(TERMINATOR);

    for item in items {
        let record = ItemRecord::from(item);
        let fields = [
            record.id,
            escape(&record.text),
            record.importance.unwrap_or_default(),
            format_optional_date(record.deadline),
            if record.is_done { "1".to_string() } else { "0".to_string() },
            format_date(record.creation_date),
            format_optional_date(record.modification_date),
        ];
        out.push_str(&fields.join(";"));
        out.push(TERMINATOR);
    }
    out
}

/// Parse CSV content.
///
/// Rows that are not valid items are skipped. A missing or unexpected header is an error.
pub fn parse(content: &str) -> Result<Parsed, String> {
    let mut rows = split_records(content)?.into_iter();

    match rows.next() {
        None => return Err("missing CSV header".to_string()),
        Some(header) => {
            if header.iter().map(|s| s.as_str()).ne(COLUMNS.iter().copied()) {
                return Err(format!("unexpected CSV header {:?}", header.join(";")));
            }
        },
    }

    let mut parsed = Parsed::default();
    for row in rows {
        parsed.push_record(record_from_row(row));
    }
    Ok(parsed)
}

/// Seconds are written in the shortest form that parses back to the exact same value
fn format_date(date: Timestamp) -> String {
    format!("{}", date.as_seconds())
}

fn format_optional_date(date: Option<Timestamp>) -> String {
    date.map(format_date).unwrap_or_default()
}

fn escape(value: &str) -> String {
    if value.contains(|c: char| c == SEPARATOR || c == '"' || c == '\r' || c == '\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn parse_date(field: &str, name: &str) -> Result<Timestamp, String> {
    field.parse::<f64>()
        .map(Timestamp::from_seconds)
        .map_err(|err| format!("invalid {} {:?}: {}", name, field, err))
}

fn parse_optional_date(field: &str, name: &str) -> Result<Option<Timestamp>, String> {
    if field.is_empty() {
        Ok(None)
    } else {
        parse_date(field, name).map(Some)
    }
}

fn record_from_row(row: Vec<String>) -> Result<ItemRecord, String> {
    if row.len() != COLUMNS.len() {
        return Err(format!("expected {} columns, got {}", COLUMNS.len(), row.len()));
    }
    let mut fields = row.into_iter();
    // The length has been checked just above
    let mut next = || fields.next().unwrap_or_default();

    let id = next();
    let text = next();
    let importance = Some(next()).filter(|s| s.is_empty() == false);
    let deadline = parse_optional_date(&next(), "deadline")?;
    let is_done = match next().as_str() {
        "1" => true,
        "0" => false,
        other => return Err(format!("invalid isDone value {:?}", other)),
    };
    let creation_date = parse_date(&next(), "creationDate")?;
    let modification_date = parse_optional_date(&next(), "modificationDate")?;

    Ok(ItemRecord {
        id, text, importance, deadline, is_done, creation_date, modification_date,
        text_color: None,
    })
}

/// Split CSV content into records of unescaped fields. Blank lines are ignored.
fn split_records(content: &str) -> Result<Vec<Vec<String>>, String> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && field_was_quoted == false => {
                in_quotes = true;
                field_was_quoted = true;
            },
            SEPARATOR => {
                record.push(std::mem::take(&mut field));
                field_was_quoted = false;
            },
            '\r' | '\n' => {
                if c == '\n' && record.is_empty() && field.is_empty() && field_was_quoted == false {
                    // Either the `\n` of a `\r\n` pair, or a blank line
                    continue;
                }
                record.push(std::mem::take(&mut field));
                field_was_quoted = false;
                push_record(&mut records, std::mem::take(&mut record));
            },
            other => field.push(other),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if field.is_empty() == false || field_was_quoted || record.is_empty() == false {
        record.push(field);
        push_record(&mut records, record);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let is_blank = record.len() == 1 && record[0].is_empty();
    if is_blank == false {
        records.push(record);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Importance, ItemId};

    const HEADER: &str = "id;text;importance;deadline;isDone;creationDate;modificationDate";

    fn sample_items() -> Vec<Item> {
        vec![
            Item::new_with_parameters(ItemId::random(), "Buy milk".to_string(), Importance::Regular,
                None, false, Timestamp::from_seconds(1_700_000_000.123_456_789), None, None),
            Item::new_with_parameters(ItemId::random(), "Call \"Mom\"; then dad\r\nmaybe".to_string(), Importance::Important,
                Some(Timestamp::from_seconds(1_700_086_400.0)), true,
                Timestamp::from_seconds(1_700_000_000.5), Some(Timestamp::from_seconds(1_700_000_001.000_000_1)), None),
            Item::new_with_parameters(ItemId::random(), "Water plants".to_string(), Importance::Unimportant,
                None, false, Timestamp::from_seconds(0.1 + 0.2), Some(Timestamp::from_seconds(1.0 / 3.0)), None),
        ]
    }

    #[test]
    fn csv_round_trip() {
        let items = sample_items();
        let content = build(&items);
        let parsed = parse(&content).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.items, items);
    }

    #[test]
    fn csv_layout() {
        let item = Item::new_with_parameters(ItemId::random(), "Buy milk".to_string(), Importance::Regular,
            None, true, Timestamp::from_seconds(1_700_000_000.0), None, None);
        let content = build(&[item.clone()]);
        let expected = format!("{}\r{};Buy milk;;;1;1700000000;\r", HEADER, item.id());
        assert_eq!(content, expected);
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let items = sample_items();
        let content = build(&items).replace("\r", "\r\n") + "\r\n\r\n";
        let parsed = parse(&content).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.items.len(), items.len());
        assert_eq!(parsed.items[0], items[0]);
        assert_eq!(parsed.items[2], items[2]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let good = Item::new("good".to_string(), Importance::Important, None);
        let content = format!("{}\r{}\r{}\r{}\r{}\r",
            HEADER,
            build(&[good.clone()]).split('\r').nth(1).unwrap(),
            "abc;bad id;;;0;1700000000;",
            format!("{};missing columns;;;0", ItemId::random()),
            format!("{};bad flag;;;yes;1700000000;", ItemId::random()),
        );
        let parsed = parse(&content).unwrap();
        assert_eq!(parsed.items, vec![good]);
        assert_eq!(parsed.skipped, 3);
    }

    #[test]
    fn header_is_required() {
        assert!(parse("").is_err());
        assert!(parse("id,text\r").is_err());
        assert!(parse("\"unterminated").is_err());
        assert_eq!(parse(&format!("{}\r", HEADER)).unwrap().items.len(), 0);
    }
}
