use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{multispace1, u32};
use nom::combinator::{opt, value};
use nom::IResult;
use nom::sequence::preceded;
use crate::browse::{ListQuery, SortDirection, SortState};
use crate::parser::{family, keyword, quoted, quoted_or_word, Statement};

/// Parse `LIST folha WHERE FUNCIONARIO LIKE 'ana' ORDER BY 'SALARIO' DESC LIMIT 10`
pub(crate) fn list(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("LIST")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, family) = family(input)?;
    let (input, filter) = opt(where_like)(input)?;
    let (input, sort) = opt(order_by)(input)?;
    let (input, limit) = opt(preceded(keyword("LIMIT"), preceded(multispace1, u32)))(input)?;

    let (column, term) = filter.unwrap_or((None, String::new()));
    let query = ListQuery {
        term,
        column,
        sort: sort.unwrap_or_default(),
        limit: limit.map(|l| l as usize),
    };
    Ok((input, Statement::List(family, query)))
}

/// Parse `SHOW nota 12`
pub(crate) fn show(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("SHOW")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, family) = family(input)?;
    let (input, _) = multispace1(input)?;
    let (input, id) = u32(input)?;
    Ok((input, Statement::Show(family, id)))
}

/// `WHERE column LIKE 'term'`, `*` searching every column
fn where_like(input: &str) -> IResult<&str, (Option<String>, String)> {
    let (input, _) = keyword("WHERE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, column) = quoted_or_word(input)?;
    let (input, _) = keyword("LIKE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, term) = quoted(input)?;

    let column = if column == "*" { None } else { Some(column) };
    Ok((input, (column, term)))
}

fn order_by(input: &str) -> IResult<&str, SortState> {
    let (input, _) = keyword("ORDER")(input)?;
    let (input, _) = keyword("BY")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, column) = quoted_or_word(input)?;
    let (input, direction) = opt(preceded(multispace1, alt((
        value(SortDirection::Asc, tag_no_case("ASC")),
        value(SortDirection::Desc, tag_no_case("DESC")),
    ))))(input)?;

    Ok((input, SortState { column: Some(column), direction: direction.unwrap_or_default() }))
}

#[cfg(test)]
mod tests {
    use crate::common::RecordFamily;
    use crate::parser::parse;
    use super::*;

    #[test]
    fn test_list() {
        assert_eq!(parse("LIST nota"), Ok(Statement::List(RecordFamily::Nota, ListQuery::default())));

        let result = parse("list folha where FUNCIONARIO like 'ana' order by 'SALARIO MES' desc limit 10");
        let query = ListQuery {
            term: "ana".to_string(),
            column: Some("FUNCIONARIO".to_string()),
            sort: SortState { column: Some("SALARIO MES".to_string()), direction: SortDirection::Desc },
            limit: Some(10),
        };
        assert_eq!(result, Ok(Statement::List(RecordFamily::Folha, query)));

        let result = parse("LIST nota WHERE * LIKE 'acme' LIMIT 5");
        let query = ListQuery { term: "acme".to_string(), column: None, sort: SortState::default(), limit: Some(5) };
        assert_eq!(result, Ok(Statement::List(RecordFamily::Nota, query)));

        let result = parse("LIST nota ORDER BY 'EMISSÃO'");
        let query = ListQuery { sort: SortState { column: Some("EMISSÃO".to_string()), direction: SortDirection::Asc }, ..Default::default() };
        assert_eq!(result, Ok(Statement::List(RecordFamily::Nota, query)));
    }

    #[test]
    fn test_show() {
        assert_eq!(parse("SHOW folha 3"), Ok(Statement::Show(RecordFamily::Folha, 3)));
        assert!(parse("SHOW folha").is_err());
    }
}
