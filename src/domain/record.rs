use std::fmt::{Display, Formatter};

/// A single scalar column value of a generated row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value as i64)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Ordered field values of one row. The pipeline never looks inside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(Vec<FieldValue>);

/// Records handed to one bulk insert call.
pub type Batch = Vec<Record>;

impl Record {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Record(fields)
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the fields of `other`, skipping its first `skip` values.
    pub fn extend_from(&mut self, other: Record, skip: usize) {
        self.0.extend(other.0.into_iter().skip(skip));
    }

    /// Tab separated line terminated by `\n`. Tabs and line breaks inside
    /// text values are replaced by spaces so framing always holds.
    pub fn to_tsv_line(&self) -> String {
        let cells: Vec<String> = self.0.iter().map(|v| tsv_cell(&v.to_string())).collect();
        tsv_join(&cells)
    }

    /// Parses one TSV line (with or without its line terminator). Cells holding a
    /// canonical integer become `Int`, everything else stays `Text`, so values such
    /// as zip codes with leading zeros survive unchanged.
    pub fn from_tsv_line(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']);
        Record(line.split('\t').map(parse_cell).collect())
    }
}

fn parse_cell(cell: &str) -> FieldValue {
    match cell.parse::<i64>() {
        Ok(n) if n.to_string() == cell => FieldValue::Int(n),
        _ => FieldValue::Text(cell.to_string()),
    }
}

impl From<Vec<FieldValue>> for Record {
    fn from(fields: Vec<FieldValue>) -> Self {
        Record(fields)
    }
}

/// Header line for the given column names.
pub fn tsv_header(columns: &[&str]) -> String {
    let cells: Vec<String> = columns.iter().map(|c| tsv_cell(c)).collect();
    tsv_join(&cells)
}

fn tsv_cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn tsv_join(cells: &[String]) -> String {
    let mut line = cells.join("\t");
    line.push('\n');
    line
}

#[cfg(test)]
mod test {
    use crate::domain::record::{tsv_header, FieldValue, Record};

    #[test]
    fn test_tsv_line_framing() {
        let record = Record::new(vec![
            FieldValue::from(42_i64),
            FieldValue::from("Casual"),
            FieldValue::from("07:05 PM"),
        ]);
        assert_eq!(record.to_tsv_line(), "42\tCasual\t07:05 PM\n");
    }

    #[test]
    fn test_tsv_line_strips_separators_from_values() {
        let record = Record::new(vec!["a\tb".into(), "c\nd".into()]);
        assert_eq!(record.to_tsv_line(), "a b\tc d\n");
    }

    #[test]
    fn test_from_tsv_line_keeps_non_canonical_numbers_as_text() {
        let record = Record::from_tsv_line("17\t01234\t-3\t+4\t07:05 PM\r\n");
        assert_eq!(
            record.fields(),
            &[
                FieldValue::Int(17),
                FieldValue::from("01234"),
                FieldValue::Int(-3),
                FieldValue::from("+4"),
                FieldValue::from("07:05 PM"),
            ]
        );
        assert_eq!(Record::from_tsv_line(&record.to_tsv_line()), record);
    }

    #[test]
    fn test_header() {
        assert_eq!(tsv_header(&["username", "email"]), "username\temail\n");
    }

    #[test]
    fn test_extend_from_skips_leading_fields() {
        let mut record = Record::new(vec!["x".into()]);
        record.extend_from(Record::new(vec![1_i64.into(), 2_i64.into(), 3_i64.into()]), 2);
        assert_eq!(record.fields(), &[FieldValue::from("x"), FieldValue::Int(3)]);
    }
}
