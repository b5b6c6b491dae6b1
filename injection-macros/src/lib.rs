mod attribute_helpers;
mod component_impl;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Component派生宏
///
/// 生成 `injection_core::Component` 实现，并通过 inventory 自动注册到组件扫描
///
/// 用法：
/// ```ignore
/// #[derive(Component)]
/// #[component("userService")]  // 可选：指定bean名称（简写形式）
/// // 或
/// #[component(name = "userService")]  // 可选：指定bean名称（完整形式）
/// #[scope("singleton")]   // 可选：指定作用域 (singleton/prototype)
/// #[lazy]                 // 可选：延迟初始化
/// #[primary]              // 可选：多个候选时优先注入
/// #[init]                 // 可选：初始化回调（默认调用 init 方法）
/// #[init("custom_init")]  // 可选：自定义初始化方法名
/// #[provides(dyn Greeter)] // 可选：可以作为 Arc<dyn Greeter> 注入
/// #[required_args]        // 可选：所有 Arc 字段作为构造参数，并生成 new()
/// struct UserService {
///     #[autowired]                 // 按类型注入，多个候选时按字段名匹配
///     user_repository: Arc<dyn Repository>,
///
///     #[qualifier("auditLog")]     // 按名称注入
///     audit: Arc<dyn Repository>,
///
///     #[autowired]                 // 可选依赖，找不到时为 None
///     cache: Option<Arc<Cache>>,
///
///     counter: u32,                // 其余字段使用 Default::default()
/// }
/// ```
#[proc_macro_derive(
    Component,
    attributes(
        component,
        scope,
        lazy,
        primary,
        init,
        provides,
        required_args,
        autowired,
        qualifier
    )
)]
#[proc_macro_error]
pub fn derive_component(input: TokenStream) -> TokenStream {
    component_impl::derive_component_impl(input)
}
