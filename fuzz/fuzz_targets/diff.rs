#![no_main]

use jd_fuzz::DiffInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: DiffInput| {
    jd_fuzz::fuzz_diff(&input.lhs, &input.rhs);
});
