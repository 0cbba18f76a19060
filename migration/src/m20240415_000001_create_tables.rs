use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// PDF 与备忘录直接存储在行内，MySQL 的 BLOB 只有 64KB，需要 LONGBLOB
fn blob_column<T: IntoIden>(name: T, backend: DbBackend) -> ColumnDef {
    let mut def = ColumnDef::new(name);
    match backend {
        DbBackend::MySql => def.custom(Alias::new("LONGBLOB")),
        _ => def.blob(),
    };
    def.null();
    def
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // 创建课程模块表
        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Modules::ModuleCode)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Modules::ModuleName).string().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建阅卷人表
        manager
            .create_table(
                Table::create()
                    .table(Markers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Markers::MarkerEmail)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Markers::Name).string().not_null())
                    .col(ColumnDef::new(Markers::Surname).string().not_null())
                    .col(ColumnDef::new(Markers::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Markers::MarkerRole).string().not_null())
                    .col(ColumnDef::new(Markers::MarkingStyle).string().not_null())
                    .col(ColumnDef::new(Markers::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Markers::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建考核表
        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assessments::ModuleCode).string().not_null())
                    .col(
                        ColumnDef::new(Assessments::AssessmentName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::LecturerEmail)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assessments::ModEmail).text().not_null())
                    .col(ColumnDef::new(Assessments::MarkerEmail).text().not_null())
                    .col(ColumnDef::new(Assessments::TotalMark).double().not_null())
                    .col(
                        ColumnDef::new(Assessments::TotalNumSubmissions)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Assessments::NumSubmissionsMarked)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(blob_column(Assessments::Memorandum, backend))
                    .col(
                        ColumnDef::new(Assessments::AssessmentType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考核-阅卷人关联表（与 assessments.marker_email 同步维护）
        manager
            .create_table(
                Table::create()
                    .table(AssessmentMarkers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentMarkers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentMarkers::AssessmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentMarkers::MarkerEmail)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AssessmentMarkers::Table, AssessmentMarkers::AssessmentId)
                            .to(Assessments::Table, Assessments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::AssessmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::StudentNum).string().not_null())
                    .col(ColumnDef::new(Submissions::StudentName).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::StudentSurname)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::SubmissionStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::SubmissionMark).double().null())
                    .col(blob_column(Submissions::SubmissionPdf, backend))
                    .col(blob_column(Submissions::MarkedSubmissionPdf, backend))
                    .col(
                        ColumnDef::new(Submissions::SubmissionFolderName)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Submissions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::AssessmentId)
                            .to(Assessments::Table, Assessments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建逐题评分表
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Questions::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Questions::QuestionText).string().not_null())
                    .col(
                        ColumnDef::new(Questions::MarkAllocation)
                            .double()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Questions::Table, Questions::SubmissionId)
                            .to(Submissions::Table, Submissions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssessmentMarkers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assessments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Markers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Modules {
    #[sea_orm(iden = "modules")]
    Table,
    ModuleCode,
    ModuleName,
}

#[derive(DeriveIden)]
enum Markers {
    #[sea_orm(iden = "markers")]
    Table,
    MarkerEmail,
    Name,
    Surname,
    PasswordHash,
    MarkerRole,
    MarkingStyle,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Assessments {
    #[sea_orm(iden = "assessments")]
    Table,
    Id,
    ModuleCode,
    AssessmentName,
    LecturerEmail,
    ModEmail,
    MarkerEmail,
    TotalMark,
    TotalNumSubmissions,
    NumSubmissionsMarked,
    Memorandum,
    AssessmentType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum AssessmentMarkers {
    #[sea_orm(iden = "assessment_markers")]
    Table,
    Id,
    AssessmentId,
    MarkerEmail,
}

#[derive(DeriveIden)]
pub(crate) enum Submissions {
    #[sea_orm(iden = "submissions")]
    Table,
    Id,
    AssessmentId,
    StudentNum,
    StudentName,
    StudentSurname,
    SubmissionStatus,
    SubmissionMark,
    #[sea_orm(iden = "submission_pdf")]
    SubmissionPdf,
    #[sea_orm(iden = "marked_submission_pdf")]
    MarkedSubmissionPdf,
    SubmissionFolderName,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Questions {
    #[sea_orm(iden = "questions")]
    Table,
    Id,
    SubmissionId,
    QuestionText,
    MarkAllocation,
}
