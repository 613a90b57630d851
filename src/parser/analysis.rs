use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, i32, multispace0, multispace1, u32};
use nom::combinator::{map, opt, value};
use nom::IResult;
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded};
use crate::analysis::company_year::CompanySelection;
use crate::parser::{dd_mm_yyyy, keyword, mm_yyyy, quoted, Statement};

/// Parse `EARNINGS FROM 01/03/2024 TO 30/04/2024 COMPANY 'ACME'`
pub(crate) fn earnings(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("EARNINGS")(input)?;
    let (input, _) = keyword("FROM")(input)?;
    let (input, start) = preceded(multispace1, dd_mm_yyyy)(input)?;
    let (input, _) = keyword("TO")(input)?;
    let (input, end) = preceded(multispace1, dd_mm_yyyy)(input)?;
    let (input, company) = opt(preceded(keyword("COMPANY"), preceded(multispace1, quoted)))(input)?;
    Ok((input, Statement::Earnings(start, end, company)))
}

/// Parse `COMPANYYEAR FROM 11/2023 TO 02/2024 COMPANIES 'ACME', 'BETA'` or `COMPANIES ALL`.
/// The period is optional.
pub(crate) fn company_year(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("COMPANYYEAR")(input)?;
    let (input, period) = opt(month_period)(input)?;
    let (input, selection) = opt(preceded(keyword("COMPANIES"), preceded(multispace1, companies)))(input)?;
    Ok((input, Statement::CompanyYear(period, selection.unwrap_or(CompanySelection::Only(vec![])))))
}

fn month_period(input: &str) -> IResult<&str, (String, String)> {
    let (input, _) = keyword("FROM")(input)?;
    let (input, start) = preceded(multispace1, mm_yyyy)(input)?;
    let (input, _) = keyword("TO")(input)?;
    let (input, end) = preceded(multispace1, mm_yyyy)(input)?;
    Ok((input, (start, end)))
}

fn companies(input: &str) -> IResult<&str, CompanySelection> {
    alt((
        value(CompanySelection::All, tag_no_case("ALL")),
        map(separated_list1(delimited(multispace0, char(','), multispace0), quoted), CompanySelection::Only),
    ))(input)
}

/// Parse `PAYROLL 2024 MONTH 3 EMPLOYEE 'ANA SOUZA'`
pub(crate) fn payroll(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("PAYROLL")(input)?;
    let (input, year) = opt(preceded(multispace1, i32))(input)?;
    let (input, month) = opt(preceded(keyword("MONTH"), preceded(multispace1, u32)))(input)?;
    let (input, employee) = opt(preceded(keyword("EMPLOYEE"), preceded(multispace1, quoted)))(input)?;
    Ok((input, Statement::Payroll(year, month, employee)))
}
