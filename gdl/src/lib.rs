//! # astify-gdl: regex-to-DFA compiler for grammar definitions
//!
//! Compiles the token patterns of a grammar definition into the sparse DFA
//! tables driven by the `astify-runtime` lexer, and provides the token front
//! end of the grammar-definition language itself.
//!
//! ## Architecture
//!
//! ```text
//!  pattern text
//!       │  automata::regex (lexed by the runtime Lexer, parsed to RegexAst)
//!       ▼
//!   RegexAst ──automata::nfa──▶ Nfa ──automata::subset──▶ SparseDfa
//!                                        │
//!                           automata::ranges (disjoint byte ranges)
//! ```

pub mod automata;
pub mod tokens;

#[cfg(test)]
mod tests;

use astify_runtime::{SparseDfa, StateType};

use automata::nfa::build_nfa;
use automata::subset::subset_construction;

pub use automata::regex::{RegexAst, RegexError};
pub use tokens::{GdlLexerConfig, GdlToken, GdlTokenKind, GdlTokenizer};

/// Statistics from one regex compilation (for diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileStats {
    pub num_nfa_states: usize,
    pub num_dfa_states: usize,
    pub num_transitions: usize,
    pub num_final_states: usize,
}

/// Compile a regex pattern to a sparse DFA.
///
/// # Errors
///
/// Returns `RegexError` if the pattern uses unsupported syntax.
pub fn compile(pattern: &str) -> Result<SparseDfa, RegexError> {
    compile_with_stats(pattern).map(|(dfa, _)| dfa)
}

/// Same as [`compile`], also reporting the sizes of the intermediate automata.
pub fn compile_with_stats(pattern: &str) -> Result<(SparseDfa, CompileStats), RegexError> {
    let ast = automata::regex::parse(pattern)?;
    Ok(compile_ast_with_stats(&ast))
}

/// Compile an already-built regex AST. Never fails.
pub fn compile_ast(ast: &RegexAst) -> SparseDfa {
    automata::regex_to_dfa(ast)
}

/// Same as [`compile_ast`], also reporting the sizes of the intermediate automata.
pub fn compile_ast_with_stats(ast: &RegexAst) -> (SparseDfa, CompileStats) {
    // Step 1: Thompson NFA
    let nfa = build_nfa(ast);
    let num_nfa_states = nfa.num_states();

    // Step 2: Subset construction (NFA → DFA)
    let dfa = subset_construction(&nfa);

    let stats = CompileStats {
        num_nfa_states,
        num_dfa_states: dfa.num_states(),
        num_transitions: dfa.num_transitions(),
        num_final_states: dfa.states.iter().filter(|s| s.kind == StateType::Final).count(),
    };

    (dfa, stats)
}
