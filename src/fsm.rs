/// Small state container driven by fixed simulation steps.
///
/// The machine only remembers where it is, where it came from and how many
/// fixed steps it has spent there. Deciding *when* to move is the caller's
/// job (see `systems::coupling`).
#[derive(Debug, Clone)]
pub struct StateMachine<S: Clone + PartialEq> {
    pub state: S,
    pub previous: S,
    /// Fixed steps completed in the current state. Reset on each transition.
    pub steps: u32,
    entered_this_step: bool,
}

impl<S: Clone + PartialEq> StateMachine<S> {
    /// `just_entered()` is true until the first `tick`.
    pub fn new(initial: S) -> Self {
        Self {
            previous: initial.clone(),
            state: initial,
            steps: 0,
            entered_this_step: true,
        }
    }

    /// Move to `next`. Returns false and leaves the counters alone if the
    /// machine is already there.
    pub fn go(&mut self, next: S) -> bool {
        if self.state == next {
            return false;
        }
        self.previous = std::mem::replace(&mut self.state, next);
        self.steps = 0;
        self.entered_this_step = true;
        true
    }

    /// Count one fixed step in the current state.
    pub fn tick(&mut self) {
        self.steps = self.steps.saturating_add(1);
        self.entered_this_step = false;
    }

    pub fn just_entered(&self) -> bool {
        self.entered_this_step
    }

    pub fn is(&self, state: &S) -> bool {
        &self.state == state
    }
}
