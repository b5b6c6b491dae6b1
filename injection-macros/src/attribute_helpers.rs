use proc_macro_error::abort;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Lit, LitStr, Meta, Token, Type};

/// 从 #[component("name")] 或 #[component(name = "name")] 中提取 bean 名称
pub(crate) fn get_bean_name(attrs: &[Attribute]) -> Option<String> {
    let attr = find_attr(attrs, "component")?;

    if let Meta::Path(_) = &attr.meta {
        return None;
    }

    if let Ok(name_lit) = attr.parse_args::<LitStr>() {
        return Some(name_lit.value());
    }

    if let Ok(Meta::NameValue(nv)) = attr.parse_args::<Meta>() {
        if nv.path.is_ident("name") {
            if let Expr::Lit(expr_lit) = &nv.value {
                if let Lit::Str(lit) = &expr_lit.lit {
                    return Some(lit.value());
                }
            }
        }
    }

    abort!(
        attr.span(),
        "expected #[component(\"beanName\")] or #[component(name = \"beanName\")]"
    )
}

/// 从属性中提取作用域
pub(crate) fn get_scope(attrs: &[Attribute]) -> proc_macro2::TokenStream {
    let Some(attr) = find_attr(attrs, "scope") else {
        return quote! { ::injection_core::Scope::Singleton };
    };

    let scope_lit = match attr.parse_args::<LitStr>() {
        Ok(lit) => lit,
        Err(_) => abort!(attr.span(), "expected #[scope(\"singleton\")] or #[scope(\"prototype\")]"),
    };

    match scope_lit.value().as_str() {
        "singleton" => quote! { ::injection_core::Scope::Singleton },
        "prototype" => quote! { ::injection_core::Scope::Prototype },
        other => abort!(
            scope_lit.span(),
            "unknown scope '{}'", other;
            help = "use \"singleton\" or \"prototype\""
        ),
    }
}

/// 是否带有无参标记属性，例如 #[lazy]、#[primary]、#[required_args]
pub(crate) fn has_flag(attrs: &[Attribute], name: &str) -> bool {
    find_attr(attrs, name).is_some()
}

/// 将 PascalCase 转换为 camelCase
pub(crate) fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// 从属性中提取 init 方法名
/// 支持格式: #[init("custom_method")] 或 #[init]（默认使用 init）
pub(crate) fn get_init_method(attrs: &[Attribute]) -> Option<syn::Ident> {
    let attr = find_attr(attrs, "init")?;

    let name = match &attr.meta {
        Meta::Path(_) => "init".to_string(),
        _ => match attr.parse_args::<LitStr>() {
            Ok(method_lit) => method_lit.value(),
            Err(_) => abort!(attr.span(), "expected #[init] or #[init(\"method_name\")]"),
        },
    };

    Some(syn::Ident::new(&name, proc_macro2::Span::call_site()))
}

/// 从 #[provides(dyn A, dyn B)] 中提取暴露的类型
pub(crate) fn get_provided_types(attrs: &[Attribute]) -> Vec<Type> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("provides"))
        .flat_map(|attr| {
            match attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated) {
                Ok(types) => types.into_iter().collect::<Vec<_>>(),
                Err(_) => abort!(attr.span(), "expected #[provides(dyn Trait, ...)]"),
            }
        })
        .collect()
}

/// 从字段的 #[qualifier("beanName")] 中提取限定名
pub(crate) fn get_qualifier(attrs: &[Attribute]) -> Option<String> {
    let attr = find_attr(attrs, "qualifier")?;

    match attr.parse_args::<LitStr>() {
        Ok(lit) => Some(lit.value()),
        Err(_) => abort!(attr.span(), "expected #[qualifier(\"beanName\")]"),
    }
}

fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}
