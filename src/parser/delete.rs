use nom::bytes::complete::tag_no_case;
use nom::character::complete::{multispace1, u32};
use nom::IResult;
use nom::multi::many1;
use nom::sequence::preceded;
use crate::db::DocumentId;
use crate::parser::{family, keyword, space_comma1, Statement};

/// Parse `DELETE nota 1, 2 3`
pub(crate) fn delete(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("DELETE")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, family) = family(input)?;
    let (input, ids) = document_ids(input)?;
    Ok((input, Statement::Delete(family, ids)))
}

/// Parse `DELETE ALL folha`
pub(crate) fn delete_all(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("DELETE")(input)?;
    let (input, _) = keyword("ALL")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, family) = family(input)?;
    Ok((input, Statement::DeleteAll(family)))
}

pub(crate) fn document_ids(input: &str) -> IResult<&str, Vec<DocumentId>> {
    many1(preceded(space_comma1, u32))(input)
}

#[cfg(test)]
mod tests {
    use crate::common::RecordFamily;
    use crate::parser::parse;
    use super::*;

    #[test]
    fn test_delete() {
        assert_eq!(parse("DELETE nota 100, 101 102"), Ok(Statement::Delete(RecordFamily::Nota, vec![100, 101, 102])));
        assert_eq!(parse("delete all FOLHA"), Ok(Statement::DeleteAll(RecordFamily::Folha)));
        assert!(parse("DELETE nota").is_err());
        assert!(parse("DELETE nota abc").is_err());
    }
}
