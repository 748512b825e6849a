// CSV export of normalized records

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tripsheet_reconcile::model::{OutputRecord, OUTPUT_COLUMNS};

/// UTF-8 byte order mark. Spreadsheet apps need it to detect UTF-8 CSV.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write the header row followed by every record. The header is written
/// even when `records` is empty.
pub fn write_records<W: Write>(writer: W, records: &[OutputRecord]) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    writer.write_record(OUTPUT_COLUMNS).map_err(|e| e.to_string())?;
    for record in records {
        writer.write_record(record.fields()).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

/// Render records as CSV text (no BOM).
pub fn render(records: &[OutputRecord]) -> Result<String, String> {
    let mut buf = Vec::new();
    write_records(&mut buf, records)?;
    String::from_utf8(buf).map_err(|e| e.to_string())
}

/// Write records to `path`, optionally prefixed with a UTF-8 BOM.
pub fn export(path: &Path, records: &[OutputRecord], bom: bool) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut out = BufWriter::new(file);
    if bom {
        out.write_all(UTF8_BOM).map_err(|e| e.to_string())?;
    }
    write_records(&mut out, records)?;
    out.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample() -> OutputRecord {
        OutputRecord {
            product_type: "国内机票".into(),
            booking_date: "2024-03-01".into(),
            cost_center: "战略市场部".into(),
            traveler_name: "张三".into(),
            itinerary_or_city: "北京-上海".into(),
            flight_or_hotel: "MU5101".into(),
            travel_or_stay_date: "2024-03-05".into(),
            receivable: "1280".into(),
            trip_order: "TR-001".into(),
            note: String::new(),
        }
    }

    fn parse(content: &str) -> Vec<csv::StringRecord> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(content.as_bytes())
            .records()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn header_is_written_without_records() {
        let text = render(&[]).unwrap();
        assert_eq!(text, format!("{}\n", OUTPUT_COLUMNS.join(",")));
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        let text = render(&[sample()]).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "国内机票,2024-03-01,战略市场部,张三,北京-上海,MU5101,2024-03-05,1280,TR-001,"
        );
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        let mut rec = sample();
        rec.note = "改签, \"临时\"\n二次".into();
        let text = render(&[rec.clone()]).unwrap();
        let rows = parse(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(9), Some(rec.note.as_str()));
    }

    #[test]
    fn export_writes_bom_when_asked() {
        let dir = tempdir().unwrap();
        let with = dir.path().join("with.csv");
        let without = dir.path().join("without.csv");

        export(&with, &[sample()], true).unwrap();
        export(&without, &[sample()], false).unwrap();

        let a = fs::read(&with).unwrap();
        let b = fs::read(&without).unwrap();
        assert!(a.starts_with(UTF8_BOM));
        assert!(!b.starts_with(UTF8_BOM));
        assert_eq!(&a[UTF8_BOM.len()..], &b[..]);
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("out.csv");
        let err = export(&path, &[], true).unwrap_err();
        assert!(err.contains("out.csv"), "{err}");
    }

    proptest! {
        #[test]
        fn records_survive_encode_and_parse(
            fields in proptest::collection::vec(".{0,12}", 10),
        ) {
            let rec = OutputRecord {
                product_type: fields[0].clone(),
                booking_date: fields[1].clone(),
                cost_center: fields[2].clone(),
                traveler_name: fields[3].clone(),
                itinerary_or_city: fields[4].clone(),
                flight_or_hotel: fields[5].clone(),
                travel_or_stay_date: fields[6].clone(),
                receivable: fields[7].clone(),
                trip_order: fields[8].clone(),
                note: fields[9].clone(),
            };
            let text = render(&[rec.clone()]).unwrap();
            let rows = parse(&text);
            prop_assert_eq!(rows.len(), 2);
            let parsed: Vec<&str> = rows[1].iter().collect();
            prop_assert_eq!(parsed, rec.fields().to_vec());
        }
    }
}
