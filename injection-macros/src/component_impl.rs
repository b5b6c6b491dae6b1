use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use proc_macro_error::abort;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Ident, Type};

use crate::attribute_helpers::{
    get_bean_name, get_init_method, get_provided_types, get_qualifier, get_scope, has_flag,
    to_camel_case,
};

/// 一个需要由容器解析的字段
struct Injection<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    /// `Arc<T>` 中的 T
    inner: &'a Type,
    /// 字段类型为 `Option<Arc<T>>`
    optional: bool,
    qualifier: Option<String>,
}

pub(crate) fn derive_component_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(
            input.generics.span(),
            "Component cannot be derived for generic types"
        );
    }

    // 默认使用类型名的 camelCase 形式，例如: FirstComponentService -> firstComponentService
    let bean_name =
        get_bean_name(&input.attrs).unwrap_or_else(|| to_camel_case(&name.to_string()));

    let scope = get_scope(&input.attrs);
    let lazy = has_flag(&input.attrs, "lazy");
    let primary = has_flag(&input.attrs, "primary");
    let required_args = has_flag(&input.attrs, "required_args");
    let init_method = get_init_method(&input.attrs);
    let provided_types = get_provided_types(&input.attrs);

    let all_fields: Vec<&Field> = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(fields) => abort!(
                fields.span(),
                "Component cannot be derived for tuple structs";
                help = "use a struct with named fields"
            ),
        },
        _ => abort!(name.span(), "Component can only be derived for structs"),
    };

    let mut injections = Vec::new();
    let mut defaulted = Vec::new();

    for field in &all_fields {
        // 命名字段一定有 ident
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let explicit = has_flag(&field.attrs, "autowired") || has_flag(&field.attrs, "qualifier");
        let injected = injected_type(&field.ty);

        match injected {
            Some((inner, optional)) if explicit || required_args => injections.push(Injection {
                ident,
                ty: &field.ty,
                inner,
                optional,
                qualifier: get_qualifier(&field.attrs),
            }),
            None if explicit => abort!(
                field.ty.span(),
                "injected field '{}' must be Arc<T> or Option<Arc<T>>", ident
            ),
            _ => defaulted.push(ident),
        }
    }

    let point_ctor = if required_args {
        quote! { parameter }
    } else {
        quote! { field }
    };

    let resolutions = injections.iter().map(|injection| {
        let ident = injection.ident;
        let inner = injection.inner;
        let point_name = ident.to_string();
        let qualifier = injection.qualifier.as_ref().map(|q| quote! { .with_qualifier(#q) });
        let resolve = if injection.optional {
            quote! { resolve_optional }
        } else {
            quote! { resolve }
        };

        quote! {
            let #ident = {
                let point = ::injection_core::InjectionPoint::#point_ctor(#bean_name, #point_name)
                    #qualifier;
                ::injection_core::Container::#resolve::<#inner>(&**__context, &point)?
            };
        }
    });

    let injected_idents: Vec<_> = injections.iter().map(|i| i.ident).collect();

    // 限定名依赖在启动前校验（可选依赖除外）
    let dependency_names: Vec<&String> = injections
        .iter()
        .filter(|i| !i.optional)
        .filter_map(|i| i.qualifier.as_ref())
        .collect();

    let construct = if required_args {
        quote! { Ok(Self::new(#(#injected_idents),*)) }
    } else {
        quote! {
            Ok(Self {
                #(#injected_idents,)*
                #(#defaulted: ::core::default::Default::default(),)*
            })
        }
    };

    let constructor = if required_args {
        let injected_types = injections.iter().map(|i| i.ty);
        quote! {
            impl #name {
                /// 由全部依赖字段组成的构造函数
                pub fn new(#(#injected_idents: #injected_types),*) -> Self {
                    Self {
                        #(#injected_idents,)*
                        #(#defaulted: ::core::default::Default::default(),)*
                    }
                }
            }
        }
    } else {
        quote! {}
    };

    let init_callback_impl = init_method.map(|method| {
        quote! {
            fn init_callback() -> Option<fn(&mut Self) -> ::injection_core::ContainerResult<()>> {
                fn __init(bean: &mut #name) -> ::injection_core::ContainerResult<()> {
                    ::injection_core::IntoResult::into_result(#name::#method(bean))
                }
                Some(__init)
            }
        }
    });

    let expose_impl = if provided_types.is_empty() {
        quote! {}
    } else {
        quote! {
            fn expose(definition: ::injection_core::BeanDefinition) -> ::injection_core::BeanDefinition {
                definition
                    #(.exposes::<Self, #provided_types>(
                        |bean: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#provided_types> { bean }
                    ))*
            }
        }
    };

    let expanded: TokenStream2 = quote! {
        impl ::injection_core::Component for #name {
            fn bean_name() -> &'static str {
                #bean_name
            }

            fn scope() -> ::injection_core::Scope {
                #scope
            }

            fn lazy() -> bool {
                #lazy
            }

            fn primary() -> bool {
                #primary
            }

            fn dependencies() -> Vec<String> {
                vec![#(#dependency_names.to_string()),*]
            }

            #init_callback_impl

            #expose_impl

            fn create_from_context(
                __context: &::std::sync::Arc<::injection_core::ApplicationContext>,
            ) -> ::injection_core::ContainerResult<Self> {
                #(#resolutions)*
                #construct
            }
        }

        #constructor

        ::injection_core::inventory::submit! {
            ::injection_core::ComponentRegistry {
                registrar: <#name as ::injection_core::Component>::register,
                name: #bean_name,
            }
        }
    };

    TokenStream::from(expanded)
}

/// `Arc<T>` -> (T, false)，`Option<Arc<T>>` -> (T, true)，其他类型返回 None
fn injected_type(ty: &Type) -> Option<(&Type, bool)> {
    if let Some(inner) = generic_argument(ty, "Option") {
        return generic_argument(inner, "Arc").map(|t| (t, true));
    }
    generic_argument(ty, "Arc").map(|t| (t, false))
}

/// 如果类型路径的最后一段是 `wrapper<T>`，返回 T
fn generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
