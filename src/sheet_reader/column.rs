use crate::common::RecordFamily;
use crate::config::ColumnOverrides;
use crate::format::{excel_serial_to_date, parse_date, parse_iso_datetime, parse_number};
use crate::value::{Row, Value};

const NOTA_IGNORED: [&str; 9] = [
    "__EMPTY", "DT.REF", "Hora",
    "Pergunta 01", "Pergunta 01 : Periodo",
    "Pergunta 02", "Pergunta 02 : Periodo Terceiros De",
    "Pergunta 03", "Pergunta 03 : Periodo Terceiros Até",
];

const NOTA_DATE: [&str; 4] = ["EMISSÃO", "EMISSAO", "DATA DIGITACAO", "DATA DIGITAÇÃO"];

const NOTA_CURRENCY: [&str; 20] = [
    "VALOR UNIT.", "VALOR UNITARIO", "VALOR UNITÁRIO", "TOTAL BRUTO", "TOTAL", "CUSTO", "ICMS", "CST",
    "DESCONTO", "ALIQ. CSLL TERCEIRO", "VALOR CSLL TERCEIRO", "ALIQ. PIS TERCEIRO", "VALOR PIS TERCEIRO",
    "ALIQ. COFINS TERCEIRO", "VALOR COFINS TERCEIRO", "VALOR", "ALIQ. INSS", "VALOR INSS", "ALIQ. IRRF",
    "VALOR IRRF",
];

const NOTA_NUMBER: [&str; 8] = ["QTD", "QUANTIDADE", "NF", "SERIE", "CLIFOR", "CNPJ", "NRCM", "TIPO PRODUTO"];

/// Payroll money columns. Also used to format payroll listings.
pub(crate) const FOLHA_CURRENCY: [&str; 29] = [
    "SALARIO", "SALÁRIO", "SALARIO MES", "SALÁRIO MÊS", "ADIANTAMENTO", "SALARIO LIQUIDO", "SALÁRIO LÍQUIDO",
    "COMISSAO+DSR", "COMISSÃO+DSR", "HORAS EXTRAS", "BONUS", "BÔNUS", "INSALUBRIDADE", "FERIAS", "FÉRIAS",
    "ODONTO", "VALE CULTURA", "FARMACIA", "FARMÁCIA", "INSS", "INSS13º", "INSS FERIAS", "INSS FÉRIAS",
    "SISTEMA S", "RAT", "FGTS", "IRRF", "IRRF FERIAS", "IRRF FÉRIAS",
];

const FOLHA_NUMBER: [&str; 3] = ["MES", "MÊS", "ANO"];

/// Tells the row processor how to type each column. Matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ColumnProfile {
    date: Vec<String>,
    currency: Vec<String>,
    number: Vec<String>,
    ignored: Vec<String>,
}

fn upper_all<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| n.as_ref().to_uppercase()).collect()
}

impl ColumnProfile {
    pub(crate) fn new<S: AsRef<str>>(date: &[S], currency: &[S], number: &[S], ignored: &[S]) -> ColumnProfile {
        ColumnProfile {
            date: upper_all(date),
            currency: upper_all(currency),
            number: upper_all(number),
            ignored: upper_all(ignored),
        }
    }

    /// Built-in profile of a family extended with the configured columns
    pub(crate) fn for_family(family: RecordFamily, overrides: &ColumnOverrides) -> ColumnProfile {
        let mut profile = match family {
            RecordFamily::Nota => ColumnProfile::new(&NOTA_DATE, &NOTA_CURRENCY, &NOTA_NUMBER, &NOTA_IGNORED),
            RecordFamily::Folha => ColumnProfile::new(&[], &FOLHA_CURRENCY, &FOLHA_NUMBER, &[]),
        };
        profile.date.extend(upper_all(&overrides.date));
        profile.currency.extend(upper_all(&overrides.currency));
        profile.number.extend(upper_all(&overrides.number));
        profile.ignored.extend(upper_all(&overrides.ignored));
        profile
    }

    pub(crate) fn is_date(&self, column: &str) -> bool {
        self.date.contains(&column.to_uppercase())
    }

    pub(crate) fn is_currency(&self, column: &str) -> bool {
        self.currency.contains(&column.to_uppercase())
    }

    pub(crate) fn is_number(&self, column: &str) -> bool {
        self.number.contains(&column.to_uppercase())
    }

    pub(crate) fn is_ignored(&self, column: &str) -> bool {
        self.ignored.contains(&column.to_uppercase())
    }

    /// Header names that survive the import
    pub(crate) fn visible_columns(&self, columns: &[String]) -> Vec<String> {
        columns.iter().filter(|c| !self.is_ignored(c)).cloned().collect()
    }
}

/// Type every row according to the profile and drop the ignored columns.
/// The original header names are kept.
pub(crate) fn process_rows(rows: &[Row], profile: &ColumnProfile) -> Vec<Row> {
    rows.iter().map(|row| process_row(row, profile)).collect()
}

fn process_row(row: &Row, profile: &ColumnProfile) -> Row {
    let mut processed = Row::new();
    for (column, value) in row.iter() {
        if profile.is_ignored(column) {
            continue;
        }

        let value = if value.is_empty() {
            value.clone()
        } else if profile.is_date(column) {
            to_date(value)
        } else if profile.is_currency(column) || profile.is_number(column) {
            to_number(value)
        } else {
            value.clone()
        };

        processed.insert(column, value);
    }
    processed
}

fn to_date(value: &Value) -> Value {
    let date = match value {
        Value::Date(d) => Some(*d),
        Value::Text(s) if s.contains('/') => parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)),
        Value::Text(s) => parse_iso_datetime(s),
        Value::Number(serial) => excel_serial_to_date(*serial),
        _ => None,
    };
    date.map(Value::Date).unwrap_or(Value::Null)
}

fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(*n),
        Value::Text(s) => Value::Number(parse_number(s)),
        _ => Value::Number(0.0),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use super::*;

    fn nota_profile() -> ColumnProfile {
        ColumnProfile::for_family(RecordFamily::Nota, &ColumnOverrides::default())
    }

    #[test]
    fn test_process_row_types_columns() {
        let row: Row = vec![
            ("NOME CLIFOR".to_string(), Value::from("ACME LTDA")),
            ("emissão".to_string(), Value::from("05/03/2024")),
            ("DATA DIGITACAO".to_string(), Value::Number(45000.0)),
            ("TOTAL BRUTO".to_string(), Value::from("1.234,56")),
            ("NF".to_string(), Value::from("123")),
            ("Hora".to_string(), Value::from("10:00")),
        ].into_iter().collect();

        let processed = process_rows(&[row], &nota_profile());
        let processed = &processed[0];

        assert_eq!(processed.get("Hora"), None);
        assert_eq!(processed.get("NOME CLIFOR"), Some(&Value::from("ACME LTDA")));
        let emissao = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(processed.get("emissão"), Some(&Value::Date(emissao)));
        let digitacao = NaiveDate::from_ymd_opt(2023, 3, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(processed.get("DATA DIGITACAO"), Some(&Value::Date(digitacao)));
        assert_eq!(processed.get("TOTAL BRUTO"), Some(&Value::Number(1234.56)));
        assert_eq!(processed.get("NF"), Some(&Value::Number(123.0)));
        assert_eq!(processed.columns().next(), Some("NOME CLIFOR"));
    }

    #[test]
    fn test_empty_values_are_kept_as_is() {
        let row: Row = vec![
            ("EMISSÃO".to_string(), Value::Null),
            ("TOTAL".to_string(), Value::from("")),
        ].into_iter().collect();
        let processed = process_rows(&[row], &nota_profile());
        assert_eq!(processed[0].get("EMISSÃO"), Some(&Value::Null));
        assert_eq!(processed[0].get("TOTAL"), Some(&Value::from("")));
    }

    #[test]
    fn test_invalid_date_becomes_null() {
        let row: Row = vec![("EMISSAO".to_string(), Value::from("99/99/2024"))].into_iter().collect();
        let processed = process_rows(&[row], &nota_profile());
        assert_eq!(processed[0].get("EMISSAO"), Some(&Value::Null));
    }

    #[test]
    fn test_overrides_extend_profile() {
        let overrides = ColumnOverrides { ignored: vec!["extra".to_string()], ..Default::default() };
        let profile = ColumnProfile::for_family(RecordFamily::Folha, &overrides);
        assert!(profile.is_ignored("EXTRA"));
        assert!(profile.is_currency("salário líquido"));
        assert!(profile.is_number("mês"));
        let columns = vec!["FUNCIONARIO".to_string(), "Extra".to_string()];
        assert_eq!(profile.visible_columns(&columns), vec!["FUNCIONARIO".to_string()]);
    }
}
