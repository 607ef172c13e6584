use cogex_core::Intake;

/// What the host observed since the previous poll.
///
/// Responses carry the index of the trial they were given for. A response
/// for any trial other than the one currently open has already been
/// resolved (a replayed or double submission) and is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Input {
    #[default]
    Idle,
    Register(Intake),
    Start,
    Submit { trial: usize, text: String },
    Select { trial: usize, choice: String },
    Continue,
}

/// Payload of a response event, borrowed from an [`Input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'a> {
    Submit(&'a str),
    Select(&'a str),
}

impl Input {
    pub fn response(&self) -> Option<(usize, Response<'_>)> {
        match self {
            Self::Submit { trial, text } => Some((*trial, Response::Submit(text))),
            Self::Select { trial, choice } => Some((*trial, Response::Select(choice))),
            _ => None,
        }
    }
}
