use std::fs;
use std::path::Path;
use csv::WriterBuilder;
use crate::common::{RecordFamily, IMPORTED_AT_FIELD, SOURCE_FILE_FIELD};
use crate::db::Document;
use crate::format::{excel_serial_to_date, format_currency, format_date, format_number, parse_iso_datetime};
use crate::sheet_reader::column::FOLHA_CURRENCY;
use crate::value::Value;

const NOTA_COLUMN_ORDER: [&str; 30] = [
    "CLIFOR", "NOME CLIFOR", "CNPJ", "TIPO", "NF", "SERIE", "VALOR UNIT.", "TOTAL BRUTO", "TOTAL", "DESCONTO",
    "EMISSÃO", "DATA DIGITACAO", "NRCM", "PRODUTO", "TIPO PRODUTO", "QTD", "CUSTO", "CFOP", "CST",
    "ALIQ. CSLL TERCEIRO", "VALOR CSLL TERCEIRO", "ALIQ. PIS TERCEIRO", "VALOR PIS TERCEIRO",
    "ALIQ. COFINS TERCEIRO", "VALOR COFINS TERCEIRO", "ICMS", "ALIQ. INSS", "VALOR INSS", "ALIQ. IRRF", "VALOR IRRF",
];

const FOLHA_COLUMN_ORDER: [&str; 25] = [
    "FUNCIONARIO", "CENTRO CUSTO", "DESCRICAO CC", "MES", "ANO", "SALARIO", "SALARIO MES", "ADIANTAMENTO",
    "SALARIO LIQUIDO", "COMISSAO+DSR", "HORAS EXTRAS", "BONUS", "INSALUBRIDADE", "FERIAS", "ODONTO",
    "VALE CULTURA", "FARMACIA", "INSS", "INSS13º", "INSS FERIAS", "SISTEMA S", "RAT", "FGTS", "IRRF", "IRRF FERIAS",
];

/// Bookkeeping fields never shown as columns
const HIDDEN_COLUMNS: [&str; 3] = ["id", SOURCE_FILE_FIELD, IMPORTED_AT_FIELD];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Column sorting of a listing, toggled one column at a time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SortState {
    pub(crate) column: Option<String>,
    pub(crate) direction: SortDirection,
}

impl SortState {
    /// Same column flips the direction, a new column starts ascending.
    pub(crate) fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = SortState::default();
    }
}

/// What a `LIST` statement asks for
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ListQuery {
    /// Term to search for. Empty keeps every document.
    pub(crate) term: String,
    /// Column searched, `None` for all columns
    pub(crate) column: Option<String>,
    pub(crate) sort: SortState,
    pub(crate) limit: Option<usize>,
}

/// Columns of a listing: the family's preferred order first, then whatever else the first
/// document carries, in its own order.
pub(crate) fn display_columns(family: RecordFamily, docs: &[Document]) -> Vec<String> {
    let first = match docs.first() {
        Some(doc) => doc,
        None => return vec![],
    };

    let keys: Vec<&str> = first.fields.columns()
        .filter(|k| !HIDDEN_COLUMNS.contains(k))
        .collect();
    order_columns(family, &keys)
}

/// Columns of an export: every column any document carries, in the listing order.
/// Documents of one collection may come from sheets with different columns.
pub(crate) fn export_columns(family: RecordFamily, docs: &[Document]) -> Vec<String> {
    let mut keys: Vec<&str> = vec![];
    for doc in docs {
        for key in doc.fields.columns() {
            if !HIDDEN_COLUMNS.contains(&key) && !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    order_columns(family, &keys)
}

fn order_columns(family: RecordFamily, keys: &[&str]) -> Vec<String> {
    let same = |a: &str, b: &str| match family {
        RecordFamily::Nota => a == b,
        RecordFamily::Folha => a.to_uppercase() == b.to_uppercase(),
    };

    let order: &[&str] = match family {
        RecordFamily::Nota => &NOTA_COLUMN_ORDER,
        RecordFamily::Folha => &FOLHA_COLUMN_ORDER,
    };

    let mut columns: Vec<String> = order.iter()
        .filter_map(|col| keys.iter().find(|k| same(k, col)))
        .map(|k| k.to_string())
        .collect();

    for key in keys.iter() {
        if !order.iter().any(|col| same(key, col)) {
            columns.push(key.to_string());
        }
    }
    columns
}

/// Keep documents whose value (in `column`, or in any column) contains `term`, ignoring case
pub(crate) fn filter_documents(docs: Vec<Document>, term: &str, column: Option<&str>) -> Vec<Document> {
    if term.is_empty() {
        return docs;
    }

    let term = term.to_lowercase();
    let matches = |v: &Value| v.to_string().to_lowercase().contains(&term);
    docs.into_iter()
        .filter(|doc| match column {
            None => doc.id.to_string().contains(&term) || doc.fields.values().any(matches),
            Some(c) => doc.fields.get(c).map(matches).unwrap_or(false),
        })
        .collect()
}

/// Stable sort by one column. Missing values sort as empty strings.
pub(crate) fn sort_documents(docs: &mut [Document], column: &str, direction: SortDirection) {
    docs.sort_by(|a, b| {
        let a = a.fields.get(column).unwrap_or(&Value::Null);
        let b = b.fields.get(column).unwrap_or(&Value::Null);
        let ordering = a.compare(b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Filter, sort and truncate a collection listing
pub(crate) fn apply_query(docs: Vec<Document>, query: &ListQuery) -> Vec<Document> {
    let mut docs = filter_documents(docs, &query.term, query.column.as_deref());
    if let Some(column) = &query.sort.column {
        sort_documents(&mut docs, column, query.sort.direction);
    }
    if let Some(limit) = query.limit {
        docs.truncate(limit);
    }
    docs
}

/// Display string of a stored value in a listing
pub(crate) fn format_value(family: RecordFamily, column: &str, value: &Value) -> String {
    match family {
        RecordFamily::Nota => format_nota_value(column, value),
        RecordFamily::Folha => format_folha_value(column, value),
    }
}

fn format_nota_value(column: &str, value: &Value) -> String {
    let key = column.to_uppercase();
    let is_date_column = key.contains("EMISSÃO") || key.contains("EMISSAO") || key.contains("DATA");

    match value {
        Value::Null => "-".to_string(),
        Value::Date(d) => format_date(d),
        Value::Text(s) if is_date_column && !s.contains('/') => parse_iso_datetime(s)
            .map(|d| format_date(&d))
            .unwrap_or_else(|| s.clone()),
        Value::Number(n) if is_date_column => excel_serial_to_date(*n)
            .map(|d| format_date(&d))
            .unwrap_or_else(|| format_number(*n, 0)),
        Value::Number(n) if ["CNPJ", "CLIFOR", "NF", "SERIE"].iter().any(|id| key.contains(id)) => {
            format!("{}", n.floor() as i64)
        },
        Value::Number(n) if ["VALOR", "PRECO", "TOTAL", "CUSTO"].iter().any(|m| key.contains(m)) => format_currency(*n),
        Value::Number(n) => format_number(*n, 0),
        other => other.to_string(),
    }
}

fn format_folha_value(column: &str, value: &Value) -> String {
    let key = column.to_uppercase();
    match value {
        Value::Null => "-".to_string(),
        Value::Number(n) if FOLHA_CURRENCY.iter().any(|c| c.to_uppercase() == key) => format_currency(*n),
        Value::Number(n) => format_number(*n, 0),
        other => other.to_string(),
    }
}

/// Write documents to a CSV file: id, the columns of every document, then the import stamps.
/// Returns the number of documents written.
pub(crate) fn export_csv(family: RecordFamily, docs: &[Document], file_path: &Path) -> anyhow::Result<usize> {
    let mut header = vec!["id".to_string()];
    header.extend(export_columns(family, docs));
    header.push(SOURCE_FILE_FIELD.to_string());
    header.push(IMPORTED_AT_FIELD.to_string());

    let mut csv_writer = WriterBuilder::new().has_headers(false).from_path(file_path)?;
    csv_writer.write_record(&header)?;
    for doc in docs {
        let mut record = vec![doc.id.to_string()];
        for column in header.iter().skip(1) {
            let cell = match doc.fields.get(column) {
                Some(Value::Date(d)) if column == IMPORTED_AT_FIELD => d.format("%Y-%m-%dT%H:%M:%S").to_string(),
                Some(v) => v.to_string(),
                None => String::new(),
            };
            record.push(cell);
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(docs.len())
}

/// Write documents to a JSON array, one object per document with its id and every stored field
pub(crate) fn export_json(docs: &[Document], file_path: &Path) -> anyhow::Result<usize> {
    let array: Vec<serde_json::Value> = docs.iter()
        .map(|doc| {
            let mut object = doc.fields.to_json();
            if let serde_json::Value::Object(map) = &mut object {
                map.insert("id".to_string(), serde_json::Value::from(doc.id));
            }
            object
        })
        .collect();

    let file = fs::File::create(file_path)?;
    serde_json::to_writer_pretty(file, &array)?;
    Ok(docs.len())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crate::value::Row;
    use super::*;

    fn doc(id: u32, fields: Vec<(&str, Value)>) -> Document {
        Document::new(id, fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect::<Row>())
    }

    fn docs() -> Vec<Document> {
        vec![
            doc(1, vec![("FUNCIONARIO", Value::from("Bruno")), ("SALARIO", Value::Number(2500.0)), ("arquivoOrigem", Value::from("a.csv"))]),
            doc(2, vec![("FUNCIONARIO", Value::from("ana")), ("SALARIO", Value::Number(900.0))]),
            doc(3, vec![("FUNCIONARIO", Value::from("Carla")), ("SALARIO", Value::Number(10000.0))]),
        ]
    }

    #[test]
    fn test_display_columns() {
        let docs = vec![doc(1, vec![
            ("extra", Value::Null), ("salario", Value::Null), ("importadoEm", Value::Null), ("Funcionario", Value::Null),
        ])];
        assert_eq!(display_columns(RecordFamily::Folha, &docs), vec!["Funcionario", "salario", "extra"]);
        // invoice columns match exactly
        assert_eq!(display_columns(RecordFamily::Nota, &docs), vec!["extra", "salario", "Funcionario"]);
        assert!(display_columns(RecordFamily::Nota, &[]).is_empty());
    }

    #[test]
    fn test_filter_documents() {
        assert_eq!(filter_documents(docs(), "", None).len(), 3);
        let found = filter_documents(docs(), "AN", Some("FUNCIONARIO"));
        assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2]);
        // any column, including the source file
        let found = filter_documents(docs(), "a.csv", None);
        assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1]);
        assert!(filter_documents(docs(), "x", Some("MISSING")).is_empty());
    }

    #[test]
    fn test_sort_documents() {
        let mut sorted = docs();
        sort_documents(&mut sorted, "SALARIO", SortDirection::Asc);
        assert_eq!(sorted.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 1, 3]);
        sort_documents(&mut sorted, "FUNCIONARIO", SortDirection::Desc);
        assert_eq!(sorted.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_toggle() {
        let mut state = SortState::default();
        state.toggle("SALARIO");
        assert_eq!(state.direction, SortDirection::Asc);
        state.toggle("SALARIO");
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle("MES");
        assert_eq!(state, SortState { column: Some("MES".to_string()), direction: SortDirection::Asc });
        state.clear();
        assert_eq!(state.column, None);
    }

    #[test]
    fn test_apply_query() {
        let query = ListQuery {
            term: "a".to_string(),
            column: Some("FUNCIONARIO".to_string()),
            sort: SortState { column: Some("SALARIO".to_string()), direction: SortDirection::Desc },
            limit: Some(2),
        };
        let result = apply_query(docs(), &query);
        assert_eq!(result.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn test_format_nota_value() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(format_value(RecordFamily::Nota, "EMISSÃO", &Value::Date(date)), "05/03/2024");
        assert_eq!(format_value(RecordFamily::Nota, "DATA DIGITACAO", &Value::from("05/03/2024")), "05/03/2024");
        assert_eq!(format_value(RecordFamily::Nota, "CNPJ", &Value::Number(12345678000199.0)), "12345678000199");
        assert_eq!(format_value(RecordFamily::Nota, "NF", &Value::Number(5001.7)), "5001");
        assert_eq!(format_value(RecordFamily::Nota, "TOTAL BRUTO", &Value::Number(1234.5)), "R$ 1.234,50");
        assert_eq!(format_value(RecordFamily::Nota, "QTD", &Value::Number(1500.0)), "1.500");
        assert_eq!(format_value(RecordFamily::Nota, "PRODUTO", &Value::Null), "-");
        assert_eq!(format_value(RecordFamily::Nota, "PRODUTO", &Value::from("Parafuso")), "Parafuso");
    }

    #[test]
    fn test_format_folha_value() {
        assert_eq!(format_value(RecordFamily::Folha, "salário líquido", &Value::Number(2550.0)), "R$ 2.550,00");
        assert_eq!(format_value(RecordFamily::Folha, "MES", &Value::Number(3.0)), "3");
        assert_eq!(format_value(RecordFamily::Folha, "FUNCIONARIO", &Value::from("ANA")), "ANA");
    }

    #[test]
    fn test_export_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let written = export_csv(RecordFamily::Folha, &docs(), &path).unwrap();
        assert_eq!(written, 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("id,FUNCIONARIO,SALARIO,arquivoOrigem,importadoEm"));
        assert_eq!(lines.next(), Some("1,Bruno,2500,a.csv,"));
        assert_eq!(lines.next(), Some("2,ana,900,,"));
    }

    #[test]
    fn test_export_csv_mixed_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        let docs = vec![
            doc(1, vec![("SALARIO", Value::Number(1000.0)), ("FUNCIONARIO", Value::from("ANA"))]),
            doc(2, vec![("FUNCIONARIO", Value::from("BIA")), ("SETOR", Value::from("RH")), ("SALARIO", Value::Number(2000.0))]),
        ];
        export_csv(RecordFamily::Folha, &docs, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![
            "id,FUNCIONARIO,SALARIO,SETOR,arquivoOrigem,importadoEm",
            "1,ANA,1000,,,",
            "2,BIA,2000,RH,,",
        ]);
        // listings still follow the first document
        assert_eq!(display_columns(RecordFamily::Folha, &docs), vec!["FUNCIONARIO", "SALARIO"]);
    }

    #[test]
    fn test_sort_mixed_column() {
        let mut docs: Vec<Document> = (1..=60)
            .map(|i| {
                let value = match i % 4 {
                    0 => Value::Null,
                    1 => Value::Number((i * 37 % 23) as f64),
                    2 => Value::from(format!("{}", i * 13 % 17).as_str()),
                    _ => Value::from(format!("x{}", i % 7).as_str()),
                };
                doc(i, vec![("SALARIO", value)])
            })
            .collect();
        docs.push(doc(61, vec![("FUNCIONARIO", Value::from("sem salario"))]));

        sort_documents(&mut docs, "SALARIO", SortDirection::Asc);
        let kind = |d: &Document| match d.fields.get("SALARIO") {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            _ => 2,
        };
        let kinds: Vec<u8> = docs.iter().map(kind).collect();
        let mut grouped = kinds.clone();
        grouped.sort();
        assert_eq!(kinds, grouped);

        let numbers: Vec<f64> = docs.iter()
            .filter_map(|d| match d.fields.get("SALARIO") { Some(Value::Number(n)) => Some(*n), _ => None })
            .collect();
        assert!(numbers.windows(2).all(|w| w[0] <= w[1]));

        sort_documents(&mut docs, "SALARIO", SortDirection::Desc);
        assert_eq!(kind(&docs[0]), 2);
    }

    #[test]
    fn test_export_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        assert_eq!(export_json(&docs(), &path).unwrap(), 3);

        let content: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content[0]["id"], 1);
        assert_eq!(content[0]["FUNCIONARIO"], "Bruno");
        assert_eq!(content[2]["SALARIO"], 10000.0);
        assert!(content[1].get("arquivoOrigem").is_none());
    }
}
