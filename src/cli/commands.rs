//! Commands reachable from the `mputf` command line.
//! `mputf` 命令行可执行的命令。

pub mod run;
