/// A help entry for one binding. Key decoding itself happens at the
/// terminal boundary; this list only drives the help view.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub keys: &'static str,
    pub action: &'static str,
}

pub const NAVIGATION: &[Binding] = &[
    Binding {
        keys: "←/h/pgup",
        action: "prev page",
    },
    Binding {
        keys: "→/l/pgdn",
        action: "next page",
    },
    Binding {
        keys: "g/home",
        action: "go to start",
    },
    Binding {
        keys: "G/end",
        action: "go to end",
    },
];

pub const TOGGLES: &[Binding] = &[
    Binding {
        keys: "/",
        action: "filter",
    },
    Binding {
        keys: "tab",
        action: "accept suggestion",
    },
    Binding {
        keys: "esc",
        action: "clear filter",
    },
    Binding {
        keys: "d",
        action: "show/hide deleted",
    },
    Binding {
        keys: "f",
        action: "toggle fullscreen",
    },
];

pub const GENERAL: &[Binding] = &[
    Binding {
        keys: "?",
        action: "close help",
    },
    Binding {
        keys: "ctrl+c",
        action: "quit",
    },
];
