//! 预导入模块，方便使用

pub use super::assessment_markers::{
    ActiveModel as AssessmentMarkerActiveModel, Entity as AssessmentMarkers,
    Model as AssessmentMarkerModel,
};
pub use super::assessments::{
    ActiveModel as AssessmentActiveModel, Entity as Assessments, Model as AssessmentModel,
};
pub use super::markers::{ActiveModel as MarkerActiveModel, Entity as Markers, Model as MarkerModel};
pub use super::modules::{ActiveModel as ModuleActiveModel, Entity as Modules, Model as ModuleModel};
pub use super::questions::{
    ActiveModel as QuestionActiveModel, Entity as Questions, Model as QuestionModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
