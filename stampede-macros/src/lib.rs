use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Ident, ItemFn};

/// Proc macro to denote a Request
///
/// Wraps the function body in the measurement hook: the call is timed, and
/// its `Result` is counted as a success or an error for the enclosing run.
///
/// NOTE: Currently this macro only works on functions with a `Result<T, E>`
/// return value.
///
/// # Example
/// ```ignore
/// use stampede::prelude::*;
///
/// #[request]
/// async fn my_request(arg_1: u32, arg_2: &str) -> Result<String, MyError> {
///     ...
/// }
/// ```
#[proc_macro_attribute]
pub fn request(attr: TokenStream, item: TokenStream) -> TokenStream {
    request_internal(attr, item).into()
}

fn request_internal(_attr: TokenStream, item: TokenStream) -> TokenStream2 {
    let input = syn::parse::<ItemFn>(item).expect("Macro only works on fn() items");

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;
    let stmts = &block.stmts;

    let success_label = format!("{}_success", sig.ident);
    let error_label = format!("{}_error", sig.ident);
    let latency_label = format!("{}_latency", sig.ident);

    quote! {
        #(#attrs)* #vis #sig {
            ::stampede::request::request_hook(
                ::stampede::core::RequestLabels {
                    success: #success_label,
                    error: #error_label,
                    latency: #latency_label,
                },
                async move {
                    #(#stmts)*
                },
            )
            .await
        }
    }
}

/// Proc macro to denote a Scenario
///
/// NOTE: Currently this macro only works on functions which take no arguments
/// and with no return value. (void functions). This is a restriction which
/// will be lifted soon.
///
/// See the `Scenario` struct for more information on the methods this macro
/// provides on functions.
///
/// # Example
/// ```ignore
/// use stampede::prelude::*;
///
/// #[scenario]
/// async fn my_scenario() {
/// }
/// ```
#[proc_macro_attribute]
pub fn scenario(attr: TokenStream, item: TokenStream) -> TokenStream {
    scenario_internal(attr, item).into()
}

fn scenario_internal(_attr: TokenStream, item: TokenStream) -> TokenStream2 {
    let input = syn::parse::<ItemFn>(item).expect("Macro only works on fn() items");

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input;
    let stmts = &block.stmts;

    let new_name = Ident::new(&format!("__stampede_{}", sig.ident), Span::call_site());
    let mut new_sig = sig.clone();
    new_sig.ident = new_name.clone();

    let mut scen_sig = sig.clone();
    let scen_name = sig.ident.clone();
    scen_sig.asyncness = None;
    scen_sig.output = syn::parse(
        quote! {
            -> impl ::stampede::scenario::ConfigurableScenario<::stampede::core::RunReport>
        }
        .into(),
    )
    .expect("Scenario signature is invalid");

    quote! {
        #(#attrs)* #vis #scen_sig {
            ::stampede::scenario::Scenario::new(stringify!(#scen_name), #new_name)
        }

        #(#attrs)* #vis #new_sig {
            #(#stmts)*
        }
    }
}
