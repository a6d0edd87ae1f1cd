use indexmap::IndexMap;
use serde::Serialize;

/// One spreadsheet row, cells already rendered as strings.
pub type Row = Vec<String>;

/// A matched row labelled by header, serialized as a flat JSON object in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    /// Pair each header with the cell at the same position.
    ///
    /// Cells past the end of a short row become empty strings; cells past the
    /// last header are dropped. A repeated header keeps its first position and
    /// takes the later cell's value.
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        let mut fields = IndexMap::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            let value = row.get(index).cloned().unwrap_or_default();
            fields.insert(header.clone(), value);
        }
        Record(fields)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty_strings() {
        let headers = strings(&["Sr. No.", "Ack. No.", "Applicant Name", "Date"]);
        let record = Record::from_row(&headers, &strings(&["7", "31505250012345"]));

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("Ack. No."), Some("31505250012345"));
        assert_eq!(record.get("Applicant Name"), Some(""));
        assert_eq!(record.get("Date"), Some(""));
    }

    #[test]
    fn cells_beyond_the_header_are_dropped() {
        let headers = strings(&["A", "B"]);
        let record = Record::from_row(&headers, &strings(&["1", "2", "3", "4"]));

        assert_eq!(record.len(), 2);
        assert_eq!(
            record.fields().collect::<Vec<_>>(),
            vec![("A", "1"), ("B", "2")]
        );
    }

    #[test]
    fn serializes_in_header_order() {
        let headers = strings(&["Zeta", "Alpha", "Mid"]);
        let record = Record::from_row(&headers, &strings(&["z", "a"]));

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"Zeta":"z","Alpha":"a","Mid":""}"#
        );
    }

    #[test]
    fn repeated_header_keeps_first_slot_and_last_value() {
        let headers = strings(&["Remarks", "Ack. No.", "Remarks"]);
        let record = Record::from_row(&headers, &strings(&["first", "12345", "second"]));

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"Remarks":"second","Ack. No.":"12345"}"#
        );
    }
}
