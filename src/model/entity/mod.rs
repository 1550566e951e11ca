mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod training_module;
pub use training_module::{TrainingModule, TrainingModuleCreate};

mod question;
pub use question::{Question, QuestionCreate};

mod choice;
pub use choice::{Choice, ChoiceCreate};

mod quiz_attempt;
pub use quiz_attempt::QuizAttempt;

mod quiz_state;
pub use quiz_state::QuizState;

mod certificate;
pub use certificate::{Certificate, CertificateCreate, CertificateRow};

mod capacitacion_link;
pub use capacitacion_link::{CapacitacionLink, CapacitacionLinkCreate};

mod presencial_session;
pub use presencial_session::{PresencialSession, PresencialSessionCreate, PresencialSessionRow};
