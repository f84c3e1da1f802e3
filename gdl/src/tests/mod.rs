mod automata_tests;
mod tokens_tests;
