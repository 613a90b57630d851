use std::borrow::Cow::{self, Borrowed, Owned};

use rustyline::completion::FilenameCompleter;
use rustyline::highlight::{Highlighter, MatchingBracketHighlighter};
use rustyline::hint::HistoryHinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Helper, Hinter};

/// Line editor helper: completes file names for IMPORT/EXPORT paths, hints from
/// history and keeps reading lines until the statement ends with `;`.
#[derive(Helper, Completer, Hinter)]
pub(crate) struct FolhadbHelper {
    #[rustyline(Completer)]
    pub(crate) completer: FilenameCompleter,
    pub(crate) highlighter: MatchingBracketHighlighter,
    #[rustyline(Hinter)]
    pub(crate) hinter: HistoryHinter,
    pub(crate) colored_prompt: String,
}

impl FolhadbHelper {
    pub(crate) fn new(prompt: &str) -> FolhadbHelper {
        FolhadbHelper {
            completer: FilenameCompleter::new(),
            highlighter: MatchingBracketHighlighter::new(),
            hinter: HistoryHinter::new(),
            colored_prompt: format!("\x1b[1;32m{prompt}\x1b[0m"),
        }
    }
}

/// Whether `input` holds a whole statement: quotes are balanced and it ends with `;`
pub(crate) fn statement_complete(input: &str) -> bool {
    let mut open_quote: Option<char> = None;
    for c in input.chars() {
        match open_quote {
            Some(q) if c == q => open_quote = None,
            Some(_) => {},
            None if c == '\'' || c == '"' => open_quote = Some(c),
            None => {},
        }
    }
    open_quote.is_none() && input.trim_end().ends_with(';')
}

impl Validator for FolhadbHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        if input.trim().is_empty() || statement_complete(input) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

impl Highlighter for FolhadbHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Borrowed(&self.colored_prompt)
        } else {
            Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned("\x1b[2m".to_owned() + hint + "\x1b[m")
    }

    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_char(&self, line: &str, pos: usize, forced: bool) -> bool {
        self.highlighter.highlight_char(line, pos, forced)
    }
}
