mod import;
mod list;
mod delete;
mod export;
mod analysis;
mod name;

use chrono::NaiveDate;
use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_till, take_while1};
use nom::character::complete::{alpha1, char, multispace0, multispace1};
use nom::combinator::{all_consuming, map, map_opt};
use nom::sequence::{delimited, preceded, terminated};
use nom::{IResult, InputTakeAtPosition};
use crate::analysis::company_year::CompanySelection;
use crate::browse::ListQuery;
use crate::common::{Error, RecordFamily};
use crate::db::DocumentId;
use crate::format::parse_date;
use crate::import::ImportOptions;
use crate::registry::NameEntry;

#[derive(Debug, PartialEq)]
pub(crate) enum Statement {
    /// IMPORT family FROM 'path' (options)
    Import(RecordFamily, String, ImportOptions),
    /// LIST family [WHERE column LIKE 'term'] [ORDER BY column] [LIMIT n]
    List(RecordFamily, ListQuery),
    Show(RecordFamily, DocumentId),
    Delete(RecordFamily, Vec<DocumentId>),
    DeleteAll(RecordFamily),
    /// EXPORT family TO 'file.csv'
    Export(RecordFamily, String),
    /// Start date, end date (both inclusive) and company to show
    Earnings(NaiveDate, NaiveDate, Option<String>),
    /// Start and end month as typed (mm/yyyy), if given, and the companies to include
    CompanyYear(Option<(String, String)>, CompanySelection),
    /// Year (latest available when missing), month and employee to show
    Payroll(Option<i32>, Option<u32>, Option<String>),
    Name(NameCommand),
}

#[derive(Debug, PartialEq)]
pub(crate) enum NameCommand {
    Add(NameEntry),
    Update(DocumentId, NameEntry),
    Delete(DocumentId),
    /// Filter term, empty for all
    List(String),
}

/// Parse one statement. A trailing `;` is optional.
pub(crate) fn parse(query: &str) -> Result<Statement, Error> {
    let query = query.trim().trim_end_matches(';').trim_end();
    let result = all_consuming(terminated(alt((
        import::import,
        list::list,
        list::show,
        delete::delete_all,
        delete::delete,
        export::export,
        analysis::earnings,
        analysis::company_year,
        analysis::payroll,
        name::name,
    )), multispace0))(query);

    match result {
        Ok((_, statement)) => Ok(statement),
        Err(e) => Err(Error::new(format!("Unable to parse statement '{query}': {e}")))
    }
}

pub(crate) fn non_space(input: &str) -> IResult<&str, &str> {
    input.split_at_position1_complete(char::is_whitespace, nom::error::ErrorKind::Space)
}

/// Whitespace and/or commas between list items
pub(crate) fn space_comma1(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace() || c == ',')(input)
}

/// Text between single or double quotes. Empty text is allowed.
pub(crate) fn quoted(input: &str) -> IResult<&str, String> {
    map(alt((
        delimited(char('\''), take_till(|c| c == '\''), char('\'')),
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
    )), |s: &str| s.to_string())(input)
}

/// Quoted text or a single word
pub(crate) fn quoted_or_word(input: &str) -> IResult<&str, String> {
    alt((quoted, map(non_space, |s: &str| s.to_string())))(input)
}

/// `nota` or `folha`
pub(crate) fn family(input: &str) -> IResult<&str, RecordFamily> {
    map_opt(alpha1, RecordFamily::from_keyword)(input)
}

/// Keyword preceded by at least one space
pub(crate) fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace1, tag_no_case(word))
}

/// `dd/mm/yyyy`
pub(crate) fn dd_mm_yyyy(input: &str) -> IResult<&str, NaiveDate> {
    map_opt(take_while1(|c: char| c.is_ascii_digit() || c == '/'), parse_date)(input)
}

/// `mm/yyyy`, checked later so a bad month can be reported as an invalid period
pub(crate) fn mm_yyyy(input: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| c.is_ascii_digit() || c == '/'), |s: &str| s.to_string())(input)
}
