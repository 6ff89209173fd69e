mod fault;
mod scenarios;
mod support;
