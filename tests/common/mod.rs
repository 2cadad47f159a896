#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Five sessions between 2021-10-01 and 2021-11-02, one of them not finished
pub const SESSIONS_CSV: &str = "\
session_id,session_launch_unix,session_end_unix,session_launch_date,session_duration_sec,session_state,username,version,cpu_count,gpu_count
s1,1633082400,1633089600,2021-10-01,7200,finished,alice,1.9.0,4,0
s2,1633125600,1633140000,2021-10-01,14400,finished,bob,1.9.1,8,1
s3,1633251600,1633255200,2021-10-03,3600,finished,alice,1.9.1,4,0
s4,1633420800,1633426200,2021-10-05,5400,failed,carol,1.8.2,2,0
s5,1635840000,1635847200,2021-11-02,7200,finished,bob,1.9.1,8,2
";

/// Same sessions without user information
pub const ANONYMOUS_CSV: &str = "\
session_launch_unix,session_end_unix,session_duration_sec,session_state,version,cpu_count,gpu_count
1633082400,1633089600,7200,finished,1.9.0,4,0
1633125600,1633140000,14400,finished,1.9.1,8,1
";

pub fn create_test_csv(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}
