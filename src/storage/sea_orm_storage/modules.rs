//! 课程模块存储操作

use super::SeaOrmStorage;
use crate::entity::modules::{ActiveModel, Column, Entity as Modules};
use crate::errors::{MaatError, Result};
use crate::models::modules::{entities::Module, requests::CreateModuleRequest};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_module_impl(&self, req: CreateModuleRequest) -> Result<Module> {
        let model = ActiveModel {
            module_code: Set(req.module_code),
            module_name: Set(req.module_name),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("创建课程模块失败: {e}")))?;

        Ok(result.into_module())
    }

    pub async fn get_module_by_code_impl(&self, module_code: &str) -> Result<Option<Module>> {
        let result = Modules::find_by_id(module_code.to_string())
            .one(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询课程模块失败: {e}")))?;

        Ok(result.map(|m| m.into_module()))
    }

    pub async fn list_modules_impl(&self) -> Result<Vec<Module>> {
        let modules = Modules::find()
            .order_by_asc(Column::ModuleCode)
            .all(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("查询课程模块列表失败: {e}")))?;

        Ok(modules.into_iter().map(|m| m.into_module()).collect())
    }

    pub async fn update_module_impl(
        &self,
        module_code: &str,
        module_name: &str,
    ) -> Result<Option<Module>> {
        if self.get_module_by_code_impl(module_code).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            module_code: Set(module_code.to_string()),
            module_name: Set(module_name.to_string()),
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("更新课程模块失败: {e}")))?;

        Ok(Some(result.into_module()))
    }

    pub async fn delete_module_impl(&self, module_code: &str) -> Result<bool> {
        let result = Modules::delete_by_id(module_code.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| MaatError::database_operation(format!("删除课程模块失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::create_storage;

    #[tokio::test]
    async fn test_module_lifecycle() {
        let storage = create_storage().await;
        storage
            .create_module_impl(CreateModuleRequest {
                module_code: "WRFV302".to_string(),
                module_name: "Advanced Programming".to_string(),
            })
            .await
            .unwrap();

        let updated = storage
            .update_module_impl("WRFV302", "Advanced Programming 3.2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.module_name, "Advanced Programming 3.2");
        assert!(storage.update_module_impl("NOPE", "x").await.unwrap().is_none());

        assert_eq!(storage.list_modules_impl().await.unwrap().len(), 1);
        assert!(storage.delete_module_impl("WRFV302").await.unwrap());
        assert!(!storage.delete_module_impl("WRFV302").await.unwrap());
        assert!(storage.get_module_by_code_impl("WRFV302").await.unwrap().is_none());
    }
}
