//! Built-in Trust Policy
//!
//! Field-tuned defaults. Every list can be replaced from a policy file
//! (see `store::load_trust_store`), these only apply when a list is omitted.

// ============================================================================
// TRUSTED PUBLISHERS
// ============================================================================

pub const TRUSTED_PUBLISHERS: &[&str] = &[
    // Platform vendors
    "Microsoft Corporation",
    "Microsoft Windows",
    "Microsoft Windows Publisher",
    "Apple Inc.",
    "Google LLC",
    // Hardware manufacturers
    "HP Inc.",
    "Hewlett-Packard",
    "HP Development Company",
    "Dell Inc.",
    "Lenovo Group Limited",
    "ASUSTeK Computer Inc.",
    // Peripherals
    "Logitech Inc.",
    "Razer Inc.",
    "Corsair Memory, Inc.",
    "SteelSeries ApS",
    // Graphics / drivers
    "NVIDIA Corporation",
    "Advanced Micro Devices, Inc.",
    "ATI Technologies Inc.",
    "Intel Corporation",
    "Realtek Semiconductor Corp.",
    // Software
    "Mozilla Corporation",
    "Oracle Corporation",
    "Adobe Inc.",
    "Adobe Systems Incorporated",
    "VMware, Inc.",
    "Citrix Systems, Inc.",
    // Security
    "Symantec Corporation",
    "McAfee, LLC",
    "Trend Micro Inc.",
    "Kaspersky Lab",
    "Avast Software",
    "Malwarebytes Inc.",
    // Communication
    "Zoom Video Communications, Inc.",
    "Cisco Systems, Inc.",
    "Slack Technologies, Inc.",
    "Discord Inc.",
    "Telegram Messenger LLP",
    // Media
    "Spotify AB",
    "Valve Corporation",
    "Epic Games, Inc.",
    // Storage / dev tools
    "Dropbox, Inc.",
    "JetBrains s.r.o.",
    "GitHub, Inc.",
    "Atlassian Pty Ltd",
];

// ============================================================================
// KNOWN SAFE NAMES
// ============================================================================

/// Application binaries exempt from flagging.
///
/// Reserved system names (`SYSTEM_BINARY_NAMES`) are deliberately absent:
/// a known-safe name is never checked for spoofing.
pub const KNOWN_SAFE_NAMES: &[&str] = &[
    "ctfmon.exe",
    "taskmgr.exe",
    "taskhostw.exe",
    "sihost.exe",
    "fontdrvhost.exe",
    "textinputhost.exe",
    "runtimebroker.exe",
    "applicationframehost.exe",
    "startmenuexperiencehost.exe",
    "searchhost.exe",
    "securityhealthsystray.exe",
    "lockapp.exe",
    // Office
    "winword.exe",
    "excel.exe",
    "powerpnt.exe",
    "outlook.exe",
    "onenote.exe",
    "teams.exe",
    "onedrive.exe",
    // Browsers
    "chrome.exe",
    "firefox.exe",
    "msedge.exe",
    "opera.exe",
    "brave.exe",
    // Dev tools
    "code.exe",
    "devenv.exe",
    "sublime_text.exe",
    "notepad.exe",
    "notepad++.exe",
    "pycharm64.exe",
    "idea64.exe",
    // Common apps
    "discord.exe",
    "slack.exe",
    "zoom.exe",
    "spotify.exe",
    "vlc.exe",
    "steam.exe",
];

// ============================================================================
// PATHS
// ============================================================================

pub const TRUSTED_PATH_PREFIXES: &[&str] = &[
    r"c:\windows\system32",
    r"c:\windows\syswow64",
    r"c:\windows\explorer.exe",
    r"c:\windows\systemapps",
    r"c:\windows\winsxs",
    r"c:\program files\windowsapps",
    r"c:\program files\",
    r"c:\program files (x86)\",
];

/// Path fragments matched case-insensitively anywhere in the normalized path
pub const SUSPICIOUS_PATH_PATTERNS: &[&str] = &[
    r"\temp\",
    r"\tmp\",
    r"\appdata\local\temp",
    r"\appdata\roaming\temp",
    r"\downloads\",
    r"\desktop\",
    r"\users\public\",
];

// ============================================================================
// KEYWORDS & SYSTEM NAMES
// ============================================================================

pub const KEYLOGGER_KEYWORDS: &[&str] = &[
    "keylog",
    "keystroke",
    "keycapture",
    "keyrecord",
    "pynput",
    "pyhook",
    "keyboard_hook",
    "kb_hook",
    "hook_keys",
    "capture_keys",
    "record_keys",
    "keyhook",
    "hookkey",
    "keysniff",
    "keyspy",
    "inputlog",
    "typelog",
];

pub const SYSTEM_BINARY_NAMES: &[&str] = &[
    "svchost.exe",
    "csrss.exe",
    "lsass.exe",
    "winlogon.exe",
    "explorer.exe",
    "dwm.exe",
    "smss.exe",
    "wininit.exe",
    "services.exe",
];

pub(crate) fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
