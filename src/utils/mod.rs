// Utilities module
//
// This module contains common utility functions:
// - validation: Address and hostname validation helpers used by the config layer

pub mod validation;
