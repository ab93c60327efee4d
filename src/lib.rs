//! School Portal - 基于角色的校园门户后端服务
//!
//! 学生、教师与管理员登录后看到各自角色的页面，
//! 数据保存在单个 SQLite 数据库中。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 会话与角色校验中间件
//! - `models`: 数据模型定义
//! - `portal`: 角色菜单与页面分派
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `session`: 登录与会话状态
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod portal;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
