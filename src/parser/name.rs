use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{multispace1, u32};
use nom::combinator::{opt, value};
use nom::IResult;
use nom::sequence::preceded;
use crate::parser::{keyword, quoted, NameCommand, Statement};
use crate::registry::{NameEntry, Status};

/// Parse the `NAME ADD|UPDATE|DELETE|LIST` registry statements
pub(crate) fn name(input: &str) -> IResult<&str, Statement> {
    let (input, _) = tag_no_case("NAME")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, command) = alt((add, update, delete, list))(input)?;
    Ok((input, Statement::Name(command)))
}

/// `ADD 'person' 'company' [ATIVO|INATIVO]`
fn add(input: &str) -> IResult<&str, NameCommand> {
    let (input, _) = tag_no_case("ADD")(input)?;
    let (input, (person, company)) = names(input)?;
    let (input, status) = opt(preceded(multispace1, status))(input)?;
    Ok((input, NameCommand::Add(NameEntry::new(&person, &company, status.unwrap_or_default()))))
}

/// `UPDATE id 'person' 'company' ATIVO|INATIVO`
fn update(input: &str) -> IResult<&str, NameCommand> {
    let (input, _) = tag_no_case("UPDATE")(input)?;
    let (input, id) = preceded(multispace1, u32)(input)?;
    let (input, (person, company)) = names(input)?;
    let (input, status) = preceded(multispace1, status)(input)?;
    Ok((input, NameCommand::Update(id, NameEntry::new(&person, &company, status))))
}

fn delete(input: &str) -> IResult<&str, NameCommand> {
    let (input, _) = tag_no_case("DELETE")(input)?;
    let (input, id) = preceded(multispace1, u32)(input)?;
    Ok((input, NameCommand::Delete(id)))
}

/// `LIST [LIKE 'term']`
fn list(input: &str) -> IResult<&str, NameCommand> {
    let (input, _) = tag_no_case("LIST")(input)?;
    let (input, term) = opt(preceded(keyword("LIKE"), preceded(multispace1, quoted)))(input)?;
    Ok((input, NameCommand::List(term.unwrap_or_default())))
}

fn names(input: &str) -> IResult<&str, (String, String)> {
    let (input, person) = preceded(multispace1, quoted)(input)?;
    let (input, company) = preceded(multispace1, quoted)(input)?;
    Ok((input, (person, company)))
}

fn status(input: &str) -> IResult<&str, Status> {
    alt((
        value(Status::Inativo, tag_no_case("INATIVO")),
        value(Status::Ativo, tag_no_case("ATIVO")),
    ))(input)
}
