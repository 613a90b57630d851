use nom::bytes::complete::tag_no_case;
use nom::character::complete::multispace1;
use nom::IResult;
use crate::parser::{family, keyword, quoted_or_word, Statement};

/// Parse `EXPORT folha TO 'file_path'` pattern.
pub(crate) fn export(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("EXPORT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, family) = family(input)?;
    let (input, _) = keyword("TO")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, file_path) = quoted_or_word(input)?;
    Ok((input, Statement::Export(family, file_path)))
}
