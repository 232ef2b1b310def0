//! Role permissions

use super::{Advice, Rejection};
use crate::context::RequestContext;
use crate::response::Response;
use async_trait::async_trait;
use bm_model::{keys, Permission, Role};
use serde_json::{Map, Value};
use warp::http::StatusCode;

/// Role of the request's user; anonymous requests act as visitors
fn role_of(ctx: &RequestContext) -> Role {
    ctx.user.as_ref().map_or(Role::Visitor, |u| u.role)
}

/// Requires the user's role to grant one permission
#[derive(Debug, Clone, Copy)]
pub struct PermissionCheck {
    permission: Permission,
}

impl PermissionCheck {
    #[must_use]
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

#[async_trait]
impl Advice for PermissionCheck {
    fn name(&self) -> &'static str {
        "permissionCheck"
    }

    async fn before(&self, ctx: RequestContext) -> Result<RequestContext, Rejection> {
        let role = role_of(&ctx);
        if role.grants(self.permission) {
            return Ok(ctx);
        }

        tracing::debug!(
            route = ctx.route,
            permission = %self.permission,
            role = ?role,
            "Permission denied"
        );
        Err(Rejection::respond(
            ctx,
            Response::err_status(StatusCode::FORBIDDEN, "Forbidden"),
        ))
    }
}

/// Exposes the role's permissions to page templates
#[derive(Debug, Default)]
pub struct PermissionGrant;

#[async_trait]
impl Advice for PermissionGrant {
    fn name(&self) -> &'static str {
        "permissionGrant"
    }

    async fn after(&self, mut ctx: RequestContext) -> RequestContext {
        let role = role_of(&ctx);
        if let Some(data_model) = ctx.response.as_mut().and_then(|r| r.data_model_mut()) {
            let granted: Map<String, Value> = Permission::ALL
                .into_iter()
                .map(|p| (p.as_str().to_string(), Value::Bool(role.grants(p))))
                .collect();
            data_model.put(keys::PERMISSIONS, granted);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Request;
    use bm_model::{DataModel, User};
    use bm_service::Session;
    use serde_json::json;
    use warp::http::Method;

    fn ctx_for(role: Option<Role>) -> RequestContext {
        let ctx = RequestContext::new(Request::new(Method::POST, "/bm"), "addBreezemoon");
        match role {
            Some(role) => {
                let user = User::new("u").with_role(role);
                ctx.with_session(Session::generate(user.id), user)
            }
            None => ctx,
        }
    }

    #[tokio::test]
    async fn check_allows_default_role() {
        let check = PermissionCheck::new(Permission::AddBreezemoon);
        assert!(check.before(ctx_for(Some(Role::Default))).await.is_ok());
        assert!(check.before(ctx_for(Some(Role::Admin))).await.is_ok());
    }

    #[tokio::test]
    async fn check_rejects_visitor_and_anonymous() {
        let check = PermissionCheck::new(Permission::RemoveBreezemoon);
        for role in [Some(Role::Visitor), None] {
            let Err(Rejection(ctx)) = check.before(ctx_for(role)).await else {
                panic!("visitor passed permission check");
            };
            assert_eq!(ctx.response.unwrap().status(), StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn grant_fills_page_permissions() {
        let ctx = ctx_for(None).respond(Response::page("breezemoon.ftl", DataModel::new()));
        let mut ctx = PermissionGrant.after(ctx).await;

        let model = ctx.response.as_mut().and_then(|r| r.data_model_mut()).unwrap();
        assert_eq!(
            model.get(keys::PERMISSIONS),
            Some(&json!({
                "commonAddBreezemoon": false,
                "commonUpdateBreezemoon": false,
                "commonRemoveBreezemoon": false,
                "commonViewBreezemoon": true,
            }))
        );
    }

    #[tokio::test]
    async fn grant_ignores_json_responses() {
        let ctx = ctx_for(Some(Role::Admin)).respond(Response::succ());
        let ctx = PermissionGrant.after(ctx).await;
        assert_eq!(ctx.response, Some(Response::succ()));
    }
}
