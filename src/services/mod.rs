//! 业务逻辑服务模块
//!
//! 封装数据读取、解析、规范化和渲染逻辑

pub mod dataset;    // 数据来源选择
pub mod graph;      // Graph 远端拉取
pub mod loader;     // CSV 解析
pub mod normalize;  // 数值规范化
pub mod render;     // HTML 渲染
pub mod store;      // CSV 覆盖写入
