pub mod expression_parser;
pub mod parser_error;
pub mod program_parser;
