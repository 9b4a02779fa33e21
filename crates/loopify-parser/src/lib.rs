//! JavaScript / TypeScript parser wrapper using SWC
//!
//! This crate turns source text into the SWC `Program` the rewrite engine
//! operates on, and keeps the source map around so byte offsets reported by
//! later stages can be turned back into line/column positions.

use std::path::Path;

use swc_common::{input::StringInput, sync::Lrc, BytePos, FileName, SourceMap};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, Syntax, TsSyntax};
use thiserror::Error;

// Re-export AST types for consumers that need to inspect the AST
pub use swc_ecma_ast;

// Re-export Spanned trait for getting spans from AST nodes
pub use swc_common::Spanned;

/// Error produced when the source cannot be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{filename}:{line}:{column}: {message}")]
    Syntax {
        filename: String,
        line: usize,
        column: usize,
        message: String,
    },
}

/// A parsed program together with the source map it was parsed from.
pub struct ParsedProgram {
    /// The parsed AST (module or script)
    pub program: Program,
    source_map: Lrc<SourceMap>,
}

impl ParsedProgram {
    /// Map an absolute byte position (as found in AST spans) to a 1-based line
    /// and 0-based display column.
    pub fn line_col(&self, pos: u32) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(BytePos(pos));
        (loc.line, loc.col_display)
    }
}

impl std::fmt::Debug for ParsedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedProgram")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

/// Pick the SWC syntax for a file based on its extension.
///
/// `.ts`, `.mts` and `.cts` parse as TypeScript, `.tsx` as TypeScript with
/// JSX; everything else parses as ECMAScript (`.jsx` with JSX enabled).
pub fn syntax_for(filename: &str) -> Syntax {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    match extension {
        "ts" | "mts" | "cts" | "tsx" => Syntax::Typescript(TsSyntax {
            tsx: extension == "tsx",
            decorators: true,
            dts: filename.ends_with(".d.ts"),
            no_early_errors: false,
            disallow_ambiguous_jsx_like: false,
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: extension == "jsx",
            ..Default::default()
        }),
    }
}

/// Parse source code into a `Program`.
///
/// Imports and exports make the result a module; otherwise it is a script.
/// Recoverable errors reported by SWC are logged as warnings.
pub fn parse_program(source: &str, filename: &str) -> Result<ParsedProgram, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let lexer = Lexer::new(
        syntax_for(filename),
        EsVersion::Es2022,
        StringInput::from(&*source_file),
        None,
    );

    let mut parser = Parser::new_from(lexer);

    let program = parser.parse_program().map_err(|e| {
        let loc = source_map.lookup_char_pos(e.span().lo);
        ParseError::Syntax {
            filename: filename.to_string(),
            line: loc.line,
            column: loc.col_display,
            message: e.kind().msg().to_string(),
        }
    })?;

    for error in parser.take_errors() {
        let loc = source_map.lookup_char_pos(error.span().lo);
        log::warn!(
            "{}:{}:{}: {}",
            filename,
            loc.line,
            loc.col_display,
            error.kind().msg()
        );
    }

    Ok(ParsedProgram {
        program,
        source_map,
    })
}
