use winnow::ascii::{line_ending, space0, space1, till_line_ending};
use winnow::combinator::{
    alt, cut_err, delimited, eof, not, opt, peek, preceded, repeat, repeat_till, separated,
    terminated,
};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::tree::{Block, ParsedNode, QuestionKind, RawPredicate, RawRule};

// -- Lines & whitespace -----------------------------------------------------

fn line_end(input: &mut &str) -> ModalResult<()> {
    alt((line_ending.void(), eof.void())).parse_next(input)
}

fn blank_line(input: &mut &str) -> ModalResult<()> {
    (space0, line_ending).void().parse_next(input)
}

fn skip_blank_lines(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(0.., blank_line).parse_next(input)?;
    // trailing spaces with no final newline
    opt((space0, eof)).parse_next(input)?;
    Ok(())
}

/// A block must be followed by a blank line, the end of input, or a directive.
fn block_boundary(input: &mut &str) -> ModalResult<()> {
    peek(alt((blank_line, (space0, eof).void(), directive_line))).parse_next(input)
}

const DIRECTIVES: [&str; 5] = ["$IF", "$ELSE", "$ENDIF", "$NEXTSTEPS", "$ENDNEXTSTEPS"];

/// Whether `line` opens with the directive `name` as a whole word.
fn starts_with_directive(line: &str, name: &str) -> bool {
    line.trim()
        .strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
}

fn is_directive(line: &str) -> bool {
    DIRECTIVES.iter().any(|name| starts_with_directive(line, name))
}

fn directive_line(input: &mut &str) -> ModalResult<()> {
    till_line_ending
        .verify(|line: &str| is_directive(line))
        .void()
        .parse_next(input)
}

fn directive(name: &'static str) -> impl FnMut(&mut &str) -> ModalResult<()> {
    move |input: &mut &str| (space0, name, space0, line_end).void().parse_next(input)
}

fn at_section_end(input: &str) -> bool {
    let line = input.lines().next().unwrap_or_default();
    starts_with_directive(line, "$ELSE") || starts_with_directive(line, "$ENDIF")
}

/// Leading indentation width. A tab advances to the next multiple of four.
fn indentation(input: &mut &str) -> ModalResult<usize> {
    take_while(0.., [' ', '\t'])
        .map(|ws: &str| {
            ws.chars()
                .fold(0, |col, c| if c == '\t' { col + 4 - col % 4 } else { col + 1 })
        })
        .parse_next(input)
}

// -- Identifiers & values ---------------------------------------------------

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Node and variable names: `[A-Za-z0-9_-]+` with an optional trailing `?`.
fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (take_while(1.., is_ident_char), opt('?'))
        .take()
        .parse_next(input)
}

fn quoted(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('\'', take_while(0.., |c: char| c != '\'' && c != '\n'), '\''),
        delimited('"', take_while(0.., |c: char| c != '"' && c != '\n'), '"'),
    ))
    .map(str::to_owned)
    .parse_next(input)
}

fn bare_value(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, ',' | '(' | ')' | '{' | '}' | '\'' | '"')
    })
    .map(str::to_owned)
    .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<String> {
    alt((quoted, bare_value))
        .context(StrContext::Expected(StrContextValue::Description("value")))
        .parse_next(input)
}

// -- Predicates -------------------------------------------------------------

fn otherwise(input: &mut &str) -> ModalResult<RawPredicate> {
    terminated(
        "otherwise",
        not(one_of(|c: char| is_ident_char(c) || c == '?' || c == '(')),
    )
    .value(RawPredicate::Otherwise)
    .parse_next(input)
}

fn function_call(input: &mut &str) -> ModalResult<RawPredicate> {
    let name = ident.parse_next(input)?;
    '('.parse_next(input)?;
    let arguments: Vec<String> = terminated(
        preceded(space0, separated(0.., value, (space0, ',', space0))),
        (space0, ')'),
    )
    .context(StrContext::Label("function arguments"))
    .parse_next(input)?;
    Ok(RawPredicate::Function {
        name: name.to_owned(),
        arguments,
    })
}

fn set_membership(input: &mut &str) -> ModalResult<RawPredicate> {
    let varname = ident.parse_next(input)?;
    (space1, "in", space1).parse_next(input)?;
    let values: Vec<String> = alt((
        delimited(
            ('(', space0),
            separated(1.., value, (space0, ',', space0)),
            (space0, ')'),
        ),
        delimited(('{', space0), separated(1.., value, space1), (space0, '}')),
    ))
    .context(StrContext::Label("set of values"))
    .parse_next(input)?;
    Ok(RawPredicate::SetMembership {
        varname: varname.to_owned(),
        values,
    })
}

fn comparison_operator<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        terminated("is", peek(space1)),
        take_while(1.., ['<', '>', '=', '!']).verify(|op: &str| op != "=>"),
    ))
    .parse_next(input)
}

fn comparison(input: &mut &str) -> ModalResult<RawPredicate> {
    let varname = ident.parse_next(input)?;
    space0.parse_next(input)?;
    let operator = comparison_operator.parse_next(input)?;
    space0.parse_next(input)?;
    let value = value.parse_next(input)?;
    Ok(RawPredicate::Comparison {
        varname: varname.to_owned(),
        operator: operator.to_owned(),
        value,
    })
}

fn named(input: &mut &str) -> ModalResult<RawPredicate> {
    ident
        .verify(|name: &str| name.ends_with('?'))
        .map(|name: &str| RawPredicate::Named(name.to_owned()))
        .parse_next(input)
}

fn single_predicate(input: &mut &str) -> ModalResult<RawPredicate> {
    alt((otherwise, function_call, set_membership, comparison, named))
        .context(StrContext::Expected(StrContextValue::Description(
            "predicate",
        )))
        .parse_next(input)
}

fn predicate(input: &mut &str) -> ModalResult<RawPredicate> {
    let first = single_predicate.parse_next(input)?;
    let rest: Vec<RawPredicate> =
        repeat(0.., preceded((space1, "and", space1), single_predicate)).parse_next(input)?;
    if rest.is_empty() {
        return Ok(first);
    }
    let mut all = Vec::with_capacity(rest.len() + 1);
    all.push(first);
    all.extend(rest);
    Ok(RawPredicate::Combined(all))
}

// -- Next node rules --------------------------------------------------------

fn outcome_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

fn rule_line(input: &mut &str, indent: usize) -> ModalResult<RawRule> {
    indentation
        .verify(|width: &usize| *width == indent)
        .parse_next(input)?;
    (one_of(['*', '-']), space1).parse_next(input)?;
    let predicate = predicate.parse_next(input)?;
    space0.parse_next(input)?;

    if opt("=>").parse_next(input)?.is_some() {
        space0.parse_next(input)?;
        let outcome = cut_err(outcome_name)
            .context(StrContext::Expected(StrContextValue::Description(
                "outcome node name",
            )))
            .parse_next(input)?;
        cut_err((space0, line_end)).parse_next(input)?;
        return Ok(RawRule::Rule {
            predicate,
            outcome: outcome.to_owned(),
        });
    }

    // A bullet holding only a predicate heads a nested rule.
    line_end.parse_next(input)?;
    let children = cut_err(|i: &mut &str| nested_rules(i, indent))
        .context(StrContext::Expected(StrContextValue::Description(
            "`=> outcome` or rules indented under the predicate",
        )))
        .parse_next(input)?;
    Ok(RawRule::Nested {
        predicate,
        children,
    })
}

/// Rules indented deeper than their parent at `indent`.
fn nested_rules(input: &mut &str, indent: usize) -> ModalResult<Vec<RawRule>> {
    let child_indent = peek(indentation).parse_next(input)?;
    if child_indent <= indent {
        return Err(ErrMode::from_input(input));
    }
    rule_list(input, child_indent)
}

fn rule_list(input: &mut &str, indent: usize) -> ModalResult<Vec<RawRule>> {
    repeat(1.., |i: &mut &str| rule_line(i, indent)).parse_next(input)
}

fn rules_block(input: &mut &str) -> ModalResult<Block> {
    let indent = peek(indentation).parse_next(input)?;
    let rules = rule_list(input, indent)?;
    cut_err(block_boundary)
        .context(StrContext::Expected(StrContextValue::Description(
            "next node rule `* predicate => outcome`",
        )))
        .parse_next(input)?;
    Ok(Block::Rules(rules))
}

// -- Questions --------------------------------------------------------------

fn question_kind(input: &mut &str) -> ModalResult<QuestionKind> {
    alt((
        "choice".value(QuestionKind::Choice),
        "text".value(QuestionKind::Text),
        "salary".value(QuestionKind::Salary),
        "date".value(QuestionKind::Date),
        "country".value(QuestionKind::Country),
    ))
    .parse_next(input)
}

fn option_pair(input: &mut &str) -> ModalResult<(String, String)> {
    let key = ident.parse_next(input)?;
    (space0, ':', space0).parse_next(input)?;
    let value = take_while(1.., |c: char| !matches!(c, ',' | ']' | '\n' | '\r'))
        .parse_next(input)?;
    Ok((key.to_owned(), value.trim().to_owned()))
}

fn question_tag(input: &mut &str) -> ModalResult<(QuestionKind, String, Vec<(String, String)>)> {
    (space0, '[').parse_next(input)?;
    let kind = question_kind.parse_next(input)?;
    ':'.parse_next(input)?;
    let (identifier, options) = cut_err(question_tag_body)
        .context(StrContext::Label("question tag"))
        .parse_next(input)?;
    Ok((kind, identifier, options))
}

fn question_tag_body(input: &mut &str) -> ModalResult<(String, Vec<(String, String)>)> {
    space0.parse_next(input)?;
    let identifier = ident.parse_next(input)?;
    let options: Vec<(String, String)> =
        repeat(0.., preceded((space0, ',', space0), option_pair)).parse_next(input)?;
    (space0, ']', space0, line_end).parse_next(input)?;
    Ok((identifier.to_owned(), options))
}

fn choice_option(input: &mut &str) -> ModalResult<(String, String)> {
    (space0, one_of(['*', '-']), space0).parse_next(input)?;
    let value = ident.parse_next(input)?;
    (':', space0).parse_next(input)?;
    let label = till_line_ending
        .verify(|l: &str| !l.trim().is_empty())
        .parse_next(input)?;
    line_end.parse_next(input)?;
    Ok((value.to_owned(), label.trim().to_owned()))
}

fn question_block(input: &mut &str) -> ModalResult<Block> {
    let (kind, identifier, options) = question_tag.parse_next(input)?;
    let choices: Vec<(String, String)> = if kind == QuestionKind::Choice {
        cut_err(repeat(1.., choice_option))
            .context(StrContext::Expected(StrContextValue::Description(
                "multiple choice option `* value: Label`",
            )))
            .parse_next(input)?
    } else {
        Vec::new()
    };
    Ok(Block::Question {
        kind,
        identifier,
        options,
        choices,
    })
}

fn start_button(input: &mut &str) -> ModalResult<Block> {
    (space0, "[start:").parse_next(input)?;
    let target = cut_err(delimited(space0, ident, (space0, ']', space0, line_end)))
        .context(StrContext::Label("start button"))
        .parse_next(input)?;
    Ok(Block::StartButton(target.to_owned()))
}

// -- Markdown ---------------------------------------------------------------

fn heading(input: &mut &str) -> ModalResult<Block> {
    (space0, '#', space1).parse_next(input)?;
    let text = till_line_ending
        .verify(|t: &str| !t.trim().is_empty())
        .parse_next(input)?;
    line_end.parse_next(input)?;
    Ok(Block::Heading(text.trim().to_owned()))
}

/// A trimmed paragraph line and the line break that ended it.
fn paragraph_line<'i>(input: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    (
        till_line_ending.verify(|l: &str| !l.trim().is_empty() && !is_directive(l)),
        alt((line_ending, eof)),
    )
        .map(|(line, ending): (&'i str, &'i str)| (line.trim(), ending))
        .parse_next(input)
}

fn paragraph(input: &mut &str) -> ModalResult<Block> {
    let lines: Vec<(&str, &str)> = repeat(1.., paragraph_line).parse_next(input)?;
    let mut text = String::new();
    let mut previous_break = "";
    for (line, ending) in lines {
        text.push_str(previous_break);
        text.push_str(line);
        previous_break = ending;
    }
    Ok(Block::Paragraph(text))
}

fn next_steps(input: &mut &str) -> ModalResult<Block> {
    (space0, "$NEXTSTEPS", space0, line_ending).parse_next(input)?;
    let (lines, ()): (Vec<&str>, ()) = cut_err(repeat_till(
        0..,
        terminated(till_line_ending, line_ending),
        directive("$ENDNEXTSTEPS"),
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "$ENDNEXTSTEPS",
    )))
    .parse_next(input)?;
    let text = lines.join("\n");
    Ok(Block::NextSteps(
        text.trim_matches(|c: char| c == '\n' || c == '\r').to_owned(),
    ))
}

// -- Conditionals -----------------------------------------------------------

fn conditional(input: &mut &str) -> ModalResult<Block> {
    (space0, "$IF", space1).parse_next(input)?;
    let predicate = cut_err(terminated(predicate, (space0, line_end)))
        .context(StrContext::Label("$IF predicate"))
        .parse_next(input)?;
    let true_case = cut_err(blocks).parse_next(input)?;
    let false_case = if opt(directive("$ELSE")).parse_next(input)?.is_some() {
        cut_err(blocks).parse_next(input)?
    } else {
        Vec::new()
    };
    cut_err(directive("$ENDIF"))
        .context(StrContext::Expected(StrContextValue::Description("$ENDIF")))
        .parse_next(input)?;
    Ok(Block::Conditional {
        predicate,
        true_case,
        false_case,
    })
}

// -- Blocks & documents -----------------------------------------------------

fn body_block(input: &mut &str) -> ModalResult<Block> {
    alt((
        conditional,
        next_steps,
        heading,
        start_button,
        question_block,
        rules_block,
        paragraph,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "heading, paragraph, question, conditional or next node rules",
    )))
    .parse_next(input)
}

/// Blocks up to the end of input or the `$ELSE`/`$ENDIF` closing the
/// enclosing conditional.
fn blocks(input: &mut &str) -> ModalResult<Vec<Block>> {
    let mut out = Vec::new();
    loop {
        skip_blank_lines(input)?;
        if input.is_empty() || at_section_end(input) {
            return Ok(out);
        }
        out.push(body_block.parse_next(input)?);
    }
}

fn front_matter_line(input: &mut &str) -> ModalResult<(String, String)> {
    let key = take_while(1.., is_ident_char).parse_next(input)?;
    (':', space0).parse_next(input)?;
    let value = till_line_ending
        .verify(|v: &str| !v.trim().is_empty())
        .parse_next(input)?;
    line_end.parse_next(input)?;
    Ok((key.to_owned(), value.trim().to_owned()))
}

fn fenced_front_matter(input: &mut &str) -> ModalResult<Vec<(String, String)>> {
    ("---", space0, line_ending).parse_next(input)?;
    cut_err(terminated(
        repeat(0.., front_matter_line),
        ("---", space0, line_end),
    ))
    .context(StrContext::Label("front matter"))
    .parse_next(input)
}

fn bare_front_matter(input: &mut &str) -> ModalResult<Vec<(String, String)>> {
    terminated(
        repeat(1.., front_matter_line),
        peek(alt((blank_line, (space0, eof).void()))),
    )
    .parse_next(input)
}

pub fn node_document(input: &mut &str) -> ModalResult<ParsedNode> {
    skip_blank_lines(input)?;
    let front_matter = opt(alt((fenced_front_matter, bare_front_matter)))
        .parse_next(input)?
        .unwrap_or_default();
    let body = blocks(input)?;
    cut_err(eof)
        .context(StrContext::Expected(StrContextValue::Description(
            "end of document",
        )))
        .parse_next(input)?;
    Ok(ParsedNode { front_matter, body })
}
