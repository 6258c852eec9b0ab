/// Events emitted during a simulation step or a state-machine action.
/// The front end turns these into sound effects and music changes.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Dropped,
    GemCollected { remaining: usize },
    KeyRevealed,
    KeyTaken,
    PlayerHit { health: u32 },
    PlayerDied,
    DoorOpened,
    DoorLocked,
    MenuClick,
    TutorialOpened,
    /// Start (or switch to) a looping track by name.
    PlayMusic(&'static str),
    StopMusic,
}
