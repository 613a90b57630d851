use log::warn;
use nom::bytes::complete::{is_not, tag_no_case};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::opt;
use nom::IResult;
use nom::sequence::{delimited, preceded};
use crate::dedup::DuplicatePolicy;
use crate::import::ImportOptions;
use crate::parser::{family, keyword, quoted_or_word, Statement};

/// Parse `IMPORT folha FROM './file/path' (dryrun, skip)`
pub(crate) fn import(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("IMPORT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, family) = family(input)?;
    let (input, _) = keyword("FROM")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, file_path) = quoted_or_word(input)?;
    let (input, import_options) = parse_import_options(input)?;

    let mut options = ImportOptions::default();
    if let Some(import_options) = import_options {
        for import_option in import_options.split(&[' ', ',']).filter(|o| !o.is_empty()) {
            let import_option = import_option.to_ascii_lowercase();
            if import_option == "dryrun" {
                options.dry_run = true;
            } else if import_option == "skip" {
                options.policy = Some(DuplicatePolicy::Skip);
            } else if import_option == "block" {
                options.policy = Some(DuplicatePolicy::Block);
            } else if let Some(index) = import_option.strip_prefix("sheet=").and_then(|i| i.parse().ok()) {
                options.sheet_index = index;
            } else {
                warn!("Ignoring unknown import option '{}'", import_option);
            }
        }
    }

    Ok((input, Statement::Import(family, file_path, options)))
}

fn parse_import_options(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(multispace0, parentheses))(input)
}

fn parentheses(input: &str) -> IResult<&str, &str> {
    delimited(char('('), is_not(")"), char(')'))(input)
}

#[cfg(test)]
mod tests {
    use crate::common::RecordFamily;
    use crate::parser::parse;
    use super::*;

    #[test]
    fn test_import() {
        let result = parse("IMPORT folha FROM './dados/folha 2024.xlsx'");
        assert_eq!(result, Ok(Statement::Import(RecordFamily::Folha, "./dados/folha 2024.xlsx".to_string(), ImportOptions::default())));

        let result = parse("import NOTA from notas.csv (dryrun, skip)");
        let options = ImportOptions { dry_run: true, policy: Some(DuplicatePolicy::Skip), sheet_index: 0 };
        assert_eq!(result, Ok(Statement::Import(RecordFamily::Nota, "notas.csv".to_string(), options)));

        let result = parse("IMPORT nota FROM 'a.xlsx'(block sheet=2 bogus)");
        let options = ImportOptions { dry_run: false, policy: Some(DuplicatePolicy::Block), sheet_index: 2 };
        assert_eq!(result, Ok(Statement::Import(RecordFamily::Nota, "a.xlsx".to_string(), options)));

        assert!(parse("IMPORT FROM 'a.csv'").is_err());
    }
}
