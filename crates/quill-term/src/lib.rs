// SPDX-License-Identifier: MIT
//
// quill-term — Terminal layer for quill.
//
// Direct terminal control via ANSI escape sequences and raw termios.
// No crossterm, no ratatui: this editor owns every byte it sends to
// the terminal and every byte it reads back. The crate splits into
//
//   ansi     — pure escape-sequence emitters over `impl Write`
//   output   — frame accumulation buffer, one write() per frame
//   input    — raw stdin bytes → logical `Key` events
//   terminal — raw mode, window size, panic-safe restore
//
// All `unsafe` in the workspace lives here, confined to the POSIX
// calls (termios, ioctl, raw fd reads/writes) that have no safe
// equivalent.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;
